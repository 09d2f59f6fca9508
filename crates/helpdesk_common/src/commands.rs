//! Menu commands triggered by the literal tokens "1" through "7".
//!
//! Matching is on the raw input: " 1", "uno" or "1." are ordinary messages.

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Menu,
    Hardware,
    ServiceStatus,
    Location,
    ScheduleVisit,
    SoftwareDiagnosis,
    HumanHandoff,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Menu,
        Command::Hardware,
        Command::ServiceStatus,
        Command::Location,
        Command::ScheduleVisit,
        Command::SoftwareDiagnosis,
        Command::HumanHandoff,
    ];

    /// Exact token lookup on unnormalized input.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "1" => Some(Self::Menu),
            "2" => Some(Self::Hardware),
            "3" => Some(Self::ServiceStatus),
            "4" => Some(Self::Location),
            "5" => Some(Self::ScheduleVisit),
            "6" => Some(Self::SoftwareDiagnosis),
            "7" => Some(Self::HumanHandoff),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Menu => "1",
            Self::Hardware => "2",
            Self::ServiceStatus => "3",
            Self::Location => "4",
            Self::ScheduleVisit => "5",
            Self::SoftwareDiagnosis => "6",
            Self::HumanHandoff => "7",
        }
    }

    /// Response text. Only `ServiceStatus` looks at the session.
    pub fn respond(&self, session: &Session) -> String {
        match self {
            Self::Menu => menu(),
            Self::Hardware => hardware_options(),
            Self::ServiceStatus => service_status(session.service_number.as_deref()),
            Self::Location => location(),
            Self::ScheduleVisit => schedule_visit(),
            Self::SoftwareDiagnosis => software_diagnosis(),
            Self::HumanHandoff => human_handoff(),
        }
    }
}

/// Response for `raw` if it is a command token.
pub fn dispatch(raw: &str, session: &Session) -> Option<String> {
    Command::parse(raw).map(|command| command.respond(session))
}

fn menu() -> String {
    "📋 Menú Principal:\n\
     1. Ver este menú\n\
     2. Problemas de Hardware\n\
     3. Consultar estado de servicio\n\
     4. Ver ubicación y horarios\n\
     5. Agendar visita técnica\n\
     6. Diagnóstico de Software\n\
     7. Hablar con un asesor humano"
        .to_string()
}

fn hardware_options() -> String {
    "Para problemas de hardware, puedes:\n\
     1. Traer tu equipo a nuestro centro (opción 4)\n\
     2. Solicitar visita técnica (opción 5)"
        .to_string()
}

fn service_status(service_number: Option<&str>) -> String {
    match service_number.filter(|n| !n.trim().is_empty()) {
        Some(number) => format!("Consultando estado del servicio {}...", number),
        None => "Por favor, proporciona tu número de servicio para consultar el estado.".to_string(),
    }
}

fn location() -> String {
    "📍 Nos encuentras en: Calle 52 # 30-15\n\
     ⏰ Horario: Lunes a Viernes de 8:00 AM a 4:00 PM"
        .to_string()
}

fn schedule_visit() -> String {
    "✅ Solicitud de visita técnica registrada. Te contactaremos pronto para confirmar el horario."
        .to_string()
}

fn software_diagnosis() -> String {
    "Por favor, describe los síntomas que presenta tu equipo para poder ayudarte mejor.".to_string()
}

fn human_handoff() -> String {
    "Te conectaremos con un asesor humano en breve. Por favor, espera un momento.".to_string()
}
