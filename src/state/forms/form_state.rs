//! Form session state and the two registration form variants

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::field::{FieldKind, FormField};
use crate::lookup::{Address, AddressLookup, LookupError};
use crate::mask::{self, MaskKind};

pub const MARITAL_STATUS_OPTIONS: &[(&str, &str)] = &[
    ("solteiro", "Solteiro(a)"),
    ("casado", "Casado(a)"),
    ("divorciado", "Divorciado(a)"),
    ("viuvo", "Viúvo(a)"),
    ("separado", "Separado(a)"),
];

pub const GENDER_OPTIONS: &[(&str, &str)] = &[
    ("masculino", "Masculino"),
    ("feminino", "Feminino"),
    ("nao-binario", "Não-binário"),
    ("prefiro-nao-dizer", "Prefiro não dizer"),
];

/// Field filled from the CEP lookup
pub const POSTAL_CODE_FIELD: &str = "cep";
pub const STREET_FIELD: &str = "endereco";
pub const DISTRICT_FIELD: &str = "bairro";
pub const CITY_FIELD: &str = "cidade";
pub const STATE_FIELD: &str = "estado";

/// Which registration form a session holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormVariant {
    /// Personal data only
    #[default]
    Short,
    /// Personal data, contact and address with CEP autofill
    Extended,
}

impl FormVariant {
    /// Build the fields of this variant, all empty
    pub fn fields(self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::text("nome", "Nome Completo"),
            FormField::text("dataNascimento", "Data de Nascimento").with_kind(FieldKind::Date),
            FormField::masked("cpf", "CPF", MaskKind::NationalId),
            FormField::select("estadoCivil", "Estado Civil", MARITAL_STATUS_OPTIONS),
            FormField::select("genero", "Gênero", GENDER_OPTIONS),
        ];

        if self == FormVariant::Extended {
            fields.extend([
                FormField::text("email", "E-mail").with_kind(FieldKind::Email),
                FormField::masked("telefone", "Telefone", MaskKind::Phone),
                FormField::masked(POSTAL_CODE_FIELD, "CEP", MaskKind::PostalCode),
                FormField::text(STREET_FIELD, "Endereço"),
                FormField::text("numero", "Número"),
                FormField::text(DISTRICT_FIELD, "Bairro"),
                FormField::text(CITY_FIELD, "Cidade"),
                FormField::text(STATE_FIELD, "Estado"),
            ]);
        }

        fields
    }

    /// Whether this variant has the CEP autofill
    pub fn has_address_lookup(self) -> bool {
        self == FormVariant::Extended
    }
}

impl fmt::Display for FormVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormVariant::Short => write!(f, "short"),
            FormVariant::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for FormVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" | "curto" => Ok(FormVariant::Short),
            "extended" | "completo" => Ok(FormVariant::Extended),
            other => Err(anyhow!("unknown form variant '{other}'")),
        }
    }
}

/// Where the session is in the edit/submit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Editing,
    /// Transient, only observable while `submit` runs
    Validating,
    Submitted,
    EditingWithErrors,
}

/// Immutable snapshot of a successfully submitted form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub session_id: Uuid,
    pub variant: FormVariant,
    pub submitted_at: DateTime<Utc>,
    pub values: BTreeMap<String, String>,
}

/// Result of [`FormSession::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(Submission),
    /// Required fields that were empty, in form order
    ValidationFailed(Vec<String>),
}

/// Result of applying an address lookup to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Address fields were overwritten
    Applied,
    /// Nothing changed
    Skipped(LookupError),
    /// The form has no address fields, nothing changed
    Unsupported,
}

/// One registration form being filled in
///
/// The session is the single owner of the field values. Masked fields only
/// ever hold masked text.
#[derive(Debug, Clone)]
pub struct FormSession {
    id: Uuid,
    variant: FormVariant,
    fields: Vec<FormField>,
    status: SessionStatus,
    errors: Vec<String>,
}

impl FormSession {
    pub fn new(variant: FormVariant) -> Self {
        Self {
            id: Uuid::new_v4(),
            variant,
            fields: variant.fields(),
            status: SessionStatus::Editing,
            errors: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn variant(&self) -> FormVariant {
        self.variant
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Required fields reported missing by the last failed submit
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Current value of `name`, `None` for fields this form does not have
    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name).map(FormField::as_text)
    }

    /// `(name, value)` pairs in form order
    pub fn values(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|f| (f.name, f.as_text()))
    }

    /// Store `raw` into `name`, masking it if the field is masked
    ///
    /// Returns the digits-only CEP when this update completed the postal
    /// code of a form with address lookup; the caller is expected to start
    /// a lookup for it. Unknown field names are ignored.
    pub fn update_field(&mut self, name: &str, raw: &str) -> Option<String> {
        let Some(field) = self.field_mut(name) else {
            debug!(field = name, "Ignoring update to unknown field");
            return None;
        };
        field.set_text(raw);
        let stored = field.as_text().to_string();
        debug!(field = name, value = %stored, "Field updated");

        self.errors.retain(|missing| missing != name);
        if self.errors.is_empty() {
            self.status = SessionStatus::Editing;
        }

        self.lookup_trigger(name, &stored)
    }

    fn lookup_trigger(&self, name: &str, value: &str) -> Option<String> {
        if !self.variant.has_address_lookup() || name != POSTAL_CODE_FIELD {
            return None;
        }
        let digits = mask::digits(value);
        (Some(digits.len()) == MaskKind::PostalCode.digit_count()).then_some(digits)
    }

    /// Check required fields and snapshot the values
    ///
    /// Never sends anything anywhere; a failed check leaves the values as
    /// they were and attaches the missing names to the session.
    pub fn submit(&mut self) -> SubmitOutcome {
        self.status = SessionStatus::Validating;

        let missing: Vec<String> = self
            .fields
            .iter()
            .filter(|f| f.required && f.is_blank())
            .map(|f| f.name.to_string())
            .collect();

        if !missing.is_empty() {
            debug!(session = %self.id, ?missing, "Submission rejected");
            self.status = SessionStatus::EditingWithErrors;
            self.errors = missing.clone();
            return SubmitOutcome::ValidationFailed(missing);
        }

        let submission = Submission {
            session_id: self.id,
            variant: self.variant,
            submitted_at: Utc::now(),
            values: self
                .values()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        };
        info!(session = %self.id, values = ?submission.values, "Form submitted");

        self.status = SessionStatus::Submitted;
        self.errors.clear();
        SubmitOutcome::Submitted(submission)
    }

    /// Resolve `postal_code` through `lookup` and fill the address fields
    ///
    /// The session stays mutably borrowed until the lookup resolves. Callers
    /// that must keep editing meanwhile run [`AddressLookup::lookup`] on their
    /// own task and hand the result to [`FormSession::apply_lookup`].
    pub async fn lookup_address(
        &mut self,
        lookup: &dyn AddressLookup,
        postal_code: &str,
    ) -> LookupOutcome {
        if !self.variant.has_address_lookup() {
            return LookupOutcome::Unsupported;
        }

        let cep = mask::digits(postal_code);
        let result = if Some(cep.len()) == MaskKind::PostalCode.digit_count() {
            lookup.lookup(&cep).await
        } else {
            Err(LookupError::InvalidPostalCode(postal_code.to_string()))
        };
        self.apply_lookup(result)
    }

    /// Apply a finished lookup
    ///
    /// A resolved address always overwrites the street, district, city and
    /// state fields, even ones the user typed by hand. Failures leave every
    /// value untouched.
    pub fn apply_lookup(&mut self, result: Result<Address, LookupError>) -> LookupOutcome {
        if !self.variant.has_address_lookup() {
            debug!(session = %self.id, "Form has no address fields, ignoring lookup");
            return LookupOutcome::Unsupported;
        }

        let address = match result {
            Ok(address) => address,
            Err(err) => {
                if err.is_not_found() {
                    info!(session = %self.id, "{err}");
                } else {
                    warn!(session = %self.id, "Address lookup failed: {err}");
                }
                return LookupOutcome::Skipped(err);
            }
        };

        for (name, value) in [
            (STREET_FIELD, address.street),
            (DISTRICT_FIELD, address.district),
            (CITY_FIELD, address.city),
            (STATE_FIELD, address.state),
        ] {
            self.update_field(name, &value);
        }
        debug!(session = %self.id, "Address fields filled from CEP");

        LookupOutcome::Applied
    }

    /// Clear every value and error, keeping the session id
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.clear();
        }
        self.errors.clear();
        self.status = SessionStatus::Editing;
    }
}
