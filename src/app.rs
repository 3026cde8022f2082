//! Application state and core logic
//!
//! The app owns the form session and is its only writer. CEP lookups run as
//! spawned tasks and report back over a channel; the main loop hands each
//! completion to [`App::apply_completion`]. In-flight lookups are never
//! cancelled or de-duplicated, so when two race the one that finishes last
//! wins.

use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::lookup::{Address, AddressLookup, LookupError};
use crate::state::{
    FieldKind, FormSession, FormVariant, LookupOutcome, SessionStatus, SubmitOutcome,
};

const HELP: &str = "\
Commands:
  set <field> <value>   store a value (masked fields are formatted)
  show                  print the form
  fields                list field names and accepted values
  submit                validate and submit the form
  reset                 clear every field
  variant <short|extended>
                        start a new form of the given kind
  help                  show this help
  quit                  leave";

/// A driver command, one per input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { field: String, value: String },
    Show,
    Fields,
    Submit,
    Reset,
    Variant(FormVariant),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let line = s.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim_start();

        let command = match word.to_ascii_lowercase().as_str() {
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if field.is_empty() {
                    bail!("usage: set <field> <value>");
                }
                Command::Set {
                    field: field.to_string(),
                    value: value.trim_start().to_string(),
                }
            }
            "show" => Command::Show,
            "fields" => Command::Fields,
            "submit" => Command::Submit,
            "reset" => Command::Reset,
            "variant" => Command::Variant(rest.parse()?),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(anyhow!("unknown command '{word}', type 'help'")),
        };
        Ok(command)
    }
}

/// A finished CEP lookup on its way back to the session
#[derive(Debug)]
pub struct LookupCompletion {
    pub session_id: Uuid,
    pub postal_code: String,
    pub result: Result<Address, LookupError>,
}

/// Main application struct
pub struct App {
    /// The form being filled in
    pub session: FormSession,
    /// Address lookup service
    lookup: Arc<dyn AddressLookup>,
    /// Sender handed to each spawned lookup
    completions: mpsc::UnboundedSender<LookupCompletion>,
    /// Lookups spawned and not yet applied
    pending_lookups: usize,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App instance and the receiver its lookups report to
    pub fn new(
        variant: FormVariant,
        lookup: Arc<dyn AddressLookup>,
    ) -> (Self, mpsc::UnboundedReceiver<LookupCompletion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Self {
            session: FormSession::new(variant),
            lookup,
            completions: tx,
            pending_lookups: 0,
            quit: false,
        };
        (app, rx)
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn pending_lookups(&self) -> usize {
        self.pending_lookups
    }

    /// Run one command and return the text to print
    pub fn handle_command(&mut self, command: Command) -> String {
        match command {
            Command::Set { field, value } => self.set_field(&field, &value),
            Command::Show => self.render_form(),
            Command::Fields => self.render_fields(),
            Command::Submit => self.submit(),
            Command::Reset => {
                self.session.reset();
                "Formulário limpo.".to_string()
            }
            Command::Variant(variant) => {
                self.session = FormSession::new(variant);
                format!("Novo formulário ({variant}).")
            }
            Command::Help => HELP.to_string(),
            Command::Quit => {
                self.quit = true;
                String::new()
            }
        }
    }

    fn set_field(&mut self, name: &str, value: &str) -> String {
        let Some(field) = self.session.field(name) else {
            return format!("Campo desconhecido: {name}");
        };
        let label = field.label;

        let trigger = self.session.update_field(name, value);
        let stored = self.session.value(name).unwrap_or_default();
        let mut out = format!("{label}: {stored}");

        if let Some(postal_code) = trigger {
            self.spawn_lookup(postal_code);
            out.push_str("\nBuscando endereço...");
        }
        out
    }

    fn spawn_lookup(&mut self, postal_code: String) {
        let lookup = Arc::clone(&self.lookup);
        let tx = self.completions.clone();
        let session_id = self.session.id();
        self.pending_lookups += 1;
        debug!(session = %session_id, cep = %postal_code, "Spawning address lookup");

        tokio::spawn(async move {
            let result = lookup.lookup(&postal_code).await;
            // The receiver only goes away when the app shuts down
            let _ = tx.send(LookupCompletion {
                session_id,
                postal_code,
                result,
            });
        });
    }

    /// Apply a finished lookup to the session it was started for
    pub fn apply_completion(&mut self, completion: LookupCompletion) -> String {
        self.pending_lookups = self.pending_lookups.saturating_sub(1);

        if completion.session_id != self.session.id() {
            debug!(cep = %completion.postal_code, "Dropping lookup for a replaced form");
            return String::new();
        }

        match self.session.apply_lookup(completion.result) {
            LookupOutcome::Applied => format!(
                "Endereço preenchido para o CEP {}: {}, {}, {} - {}",
                completion.postal_code,
                self.session.value("endereco").unwrap_or_default(),
                self.session.value("bairro").unwrap_or_default(),
                self.session.value("cidade").unwrap_or_default(),
                self.session.value("estado").unwrap_or_default(),
            ),
            LookupOutcome::Skipped(err) if err.is_not_found() => {
                format!("CEP {} não encontrado.", completion.postal_code)
            }
            LookupOutcome::Skipped(err) => format!("Falha ao buscar o CEP: {err}"),
            LookupOutcome::Unsupported => "Formulário sem campos de endereço.".to_string(),
        }
    }

    fn submit(&mut self) -> String {
        match self.session.submit() {
            SubmitOutcome::Submitted(submission) => {
                let data = serde_json::to_string_pretty(&submission)
                    .unwrap_or_else(|e| format!("<unprintable: {e}>"));
                format!("Formulário enviado! Seus dados foram enviados com sucesso.\n{data}")
            }
            SubmitOutcome::ValidationFailed(missing) => {
                let labels: Vec<&str> = missing
                    .iter()
                    .filter_map(|name| self.session.field(name))
                    .map(|f| f.label)
                    .collect();
                let labels = labels.join(", ");
                format!("Por favor, preencha todos os campos obrigatórios.\nFaltando: {labels}")
            }
        }
    }

    fn render_form(&self) -> String {
        let mut out = format!("Formulário de Cadastro ({})\n", self.session.variant());
        let errors = self.session.errors();
        for field in self.session.fields() {
            let marker = if errors.iter().any(|e| e == field.name) {
                "!"
            } else if field.required {
                "*"
            } else {
                " "
            };
            let _ = writeln!(
                out,
                "{marker} {:<20} {}",
                field.label,
                field.display_value()
            );
        }
        let status = match self.session.status() {
            SessionStatus::Editing | SessionStatus::Validating => "editando",
            SessionStatus::EditingWithErrors => "campos pendentes",
            SessionStatus::Submitted => "enviado",
        };
        let _ = write!(out, "Status: {status}");
        if self.pending_lookups > 0 {
            let _ = write!(out, " (buscando endereço)");
        }
        out
    }

    fn render_fields(&self) -> String {
        let mut lines = Vec::new();
        for field in self.session.fields() {
            let hint = match &field.kind {
                FieldKind::Select(options) => options
                    .iter()
                    .map(|(value, _)| *value)
                    .collect::<Vec<_>>()
                    .join(" | "),
                _ => field.placeholder().unwrap_or("texto").to_string(),
            };
            lines.push(format!("{:<16} {hint}", field.name));
        }
        lines.join("\n")
    }
}
