//! Console conversation loop.
//!
//! Generic over input/output so the whole flow can be driven from tests.

use anyhow::Result;
use helpdesk_common::session::{validate_customer_name, validate_phone};
use helpdesk_common::{Dialogue, Session, SessionFieldError};
use std::io::{BufRead, Write};

/// Interactive session state for one console conversation.
pub struct Console<'a, R, W> {
    dialogue: &'a Dialogue,
    bot_name: &'a str,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub fn new(dialogue: &'a Dialogue, bot_name: &'a str, input: R, output: W) -> Self {
        Self {
            dialogue,
            bot_name,
            input,
            output,
        }
    }

    /// Banner, customer details, then the chat loop.
    ///
    /// Returns the session when the customer says goodbye or input ends.
    pub fn run(mut self) -> Result<Session> {
        let mut session = Session::new();
        self.print_banner()?;

        if !self.collect_customer(&mut session)? {
            return Ok(session);
        }

        self.print_help()?;

        let prompt = format!("{}: ", session.customer_name.as_deref().unwrap_or("Tú"));
        while let Some(line) = self.prompt(&prompt)? {
            if line.is_empty() {
                writeln!(self.output, "❌ Por favor, escribe algo...")?;
                continue;
            }

            let response = self.dialogue.process_message(&mut session, &line);
            writeln!(self.output, "🤖 {}: {}", self.bot_name, response)?;

            if session.is_ended() {
                break;
            }
        }

        Ok(session)
    }

    fn print_banner(&mut self) -> Result<()> {
        let rule = "=".repeat(50);
        writeln!(self.output)?;
        writeln!(self.output, "{}", rule)?;
        writeln!(self.output, "👨‍💻 ¡Bienvenido al Soporte Técnico de Computadoras!")?;
        writeln!(self.output, "🤖 Soy {}, tu asistente virtual.", self.bot_name)?;
        writeln!(self.output, "{}", rule)?;
        writeln!(self.output)?;
        Ok(())
    }

    fn print_help(&mut self) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "📌 Comandos disponibles:")?;
        writeln!(self.output, "- Presiona '1' para ver el menú de opciones")?;
        writeln!(self.output, "- Escribe 'Adiós' o 'chao' para salir")?;
        writeln!(
            self.output,
            "📝 Cuéntame tu problema (ejemplo: 'Mi computadora está lenta')"
        )?;
        writeln!(self.output)?;
        Ok(())
    }

    /// Name and phone, re-prompting until valid. `false` if input ended first.
    fn collect_customer(&mut self, session: &mut Session) -> Result<bool> {
        writeln!(
            self.output,
            "📝 Por favor, proporciona tus datos para brindarte mejor atención:"
        )?;

        let Some(name) = self.prompt_valid("Nombre completo: ", validate_customer_name, "nombre")?
        else {
            return Ok(false);
        };
        session.customer_name = Some(name);

        let Some(phone) = self.prompt_valid("Número de teléfono: ", validate_phone, "número de teléfono")?
        else {
            return Ok(false);
        };
        session.phone = Some(phone);

        Ok(true)
    }

    fn prompt_valid(
        &mut self,
        prompt: &str,
        validate: fn(&str) -> Result<String, SessionFieldError>,
        what: &str,
    ) -> Result<Option<String>> {
        while let Some(line) = self.prompt(prompt)? {
            match validate(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => {
                    tracing::debug!("Rejected {}: {}", what, e);
                    writeln!(self.output, "❌ Por favor, ingresa un {} válido", what)?;
                }
            }
        }
        Ok(None)
    }

    /// Print `prompt` and read one trimmed line; `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
