//! Sign-in / sign-up page.
//!
//! The form state is a plain value updated by [`AuthForm::reduce`]; validation is a
//! pair of pure functions. [`AuthPage`] glues both to the session flag and the
//! notification and navigation boundaries.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    context::AppContext,
    error::{Result, ValidationError},
    navigation::Destination,
    notify::Notification,
    outcome::SubmitOutcome,
};

pub const PHONE_PLACEHOLDER: &str = "(11) 99999-9999";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

/// Individual (CPF) or organization (CNPJ). Only labels change between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonType {
    Individual,
    Organization,
}

impl PersonType {
    pub fn label(&self) -> &'static str {
        match self {
            PersonType::Individual => "Pessoa Física",
            PersonType::Organization => "Pessoa Jurídica",
        }
    }

    pub fn name_label(&self) -> &'static str {
        match self {
            PersonType::Individual => "Nome Completo",
            PersonType::Organization => "Razão Social",
        }
    }

    pub fn tax_id_label(&self) -> &'static str {
        match self {
            PersonType::Individual => "CPF",
            PersonType::Organization => "CNPJ",
        }
    }

    pub fn tax_id_placeholder(&self) -> &'static str {
        match self {
            PersonType::Individual => "000.000.000-00",
            PersonType::Organization => "00.000.000/0001-00",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationData {
    pub name_or_company: String,
    pub tax_id: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationData {
    fn field_mut(&mut self, field: RegistrationField) -> &mut String {
        match field {
            RegistrationField::NameOrCompany => &mut self.name_or_company,
            RegistrationField::TaxId => &mut self.tax_id,
            RegistrationField::Phone => &mut self.phone,
            RegistrationField::Email => &mut self.email,
            RegistrationField::Password => &mut self.password,
            RegistrationField::ConfirmPassword => &mut self.confirm_password,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationField {
    NameOrCompany,
    TaxId,
    Phone,
    Email,
    Password,
    ConfirmPassword,
}

/// What the sign-up tab is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpScreen {
    ChoosePersonType,
    Form(PersonType),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthAction {
    SwitchMode(AuthMode),
    SetLoginPhone(String),
    SetLoginPassword(String),
    /// Pick a person type; always starts from an empty registration form.
    ChoosePersonType(PersonType),
    /// Back to the person-type choice. Field contents are kept.
    BackToPersonTypeChoice,
    SetRegistrationField(RegistrationField, String),
    SetAcceptedTerms(bool),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub person_type: Option<PersonType>,
    pub login: LoginCredentials,
    pub registration: RegistrationData,
    pub accepted_terms: bool,
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(mut self, action: AuthAction) -> Self {
        match action {
            AuthAction::SwitchMode(mode) => self.mode = mode,
            AuthAction::SetLoginPhone(phone) => self.login.phone = phone,
            AuthAction::SetLoginPassword(password) => self.login.password = password,
            AuthAction::ChoosePersonType(kind) => {
                self.person_type = Some(kind);
                self.registration = RegistrationData::default();
            }
            AuthAction::BackToPersonTypeChoice => self.person_type = None,
            AuthAction::SetRegistrationField(field, value) => {
                *self.registration.field_mut(field) = value;
            }
            AuthAction::SetAcceptedTerms(accepted) => self.accepted_terms = accepted,
        }
        self
    }

    pub fn sign_up_screen(&self) -> SignUpScreen {
        match self.person_type {
            Some(kind) => SignUpScreen::Form(kind),
            None => SignUpScreen::ChoosePersonType,
        }
    }
}

pub fn validate_sign_in(login: &LoginCredentials) -> std::result::Result<(), ValidationError> {
    if login.phone.is_empty() || login.password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

/// Checks run in order and stop at the first failure: person type chosen,
/// terms accepted, passwords equal, required fields filled.
pub fn validate_sign_up(form: &AuthForm) -> std::result::Result<(), ValidationError> {
    if form.person_type.is_none() {
        return Err(ValidationError::PersonTypeNotChosen);
    }
    if !form.accepted_terms {
        return Err(ValidationError::TermsNotAccepted);
    }
    let data = &form.registration;
    if data.password != data.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if data.name_or_company.is_empty()
        || data.tax_id.is_empty()
        || data.phone.is_empty()
        || data.email.is_empty()
    {
        return Err(ValidationError::IncompleteRegistration);
    }
    Ok(())
}

/// The mounted auth page
pub struct AuthPage {
    ctx: AppContext,
    form: AuthForm,
}

impl AuthPage {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            form: AuthForm::new(),
        }
    }

    pub fn form(&self) -> &AuthForm {
        &self.form
    }

    pub fn dispatch(&mut self, action: AuthAction) {
        self.form = std::mem::take(&mut self.form).reduce(action);
    }

    /// Submit whichever tab is active.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        let (checked, success_message) = match self.form.mode {
            AuthMode::SignIn => (
                validate_sign_in(&self.form.login),
                "Login realizado com sucesso!",
            ),
            AuthMode::SignUp => (
                validate_sign_up(&self.form),
                "Cadastro realizado com sucesso!",
            ),
        };

        if let Err(error) = checked {
            warn!(mode = ?self.form.mode, error = %error, "Auth form rejected");
            self.ctx.notify(Notification::error(error.to_string()));
            return Ok(SubmitOutcome::Rejected(error));
        }

        self.ctx.session.establish().await?;
        info!(mode = ?self.form.mode, "User authenticated");
        self.ctx.notify(Notification::success(success_message));
        self.ctx.navigate(Destination::Dashboard);
        Ok(SubmitOutcome::Accepted(Destination::Dashboard))
    }

    pub fn back(&self) {
        self.ctx.navigate(Destination::Home);
    }

    pub fn open_terms(&self) {
        self.ctx.navigate(Destination::Terms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{navigation::NavigationLog, notify::NotificationLog, notify::Severity};
    use std::sync::Arc;

    fn filled_sign_up() -> AuthForm {
        [
            AuthAction::SwitchMode(AuthMode::SignUp),
            AuthAction::ChoosePersonType(PersonType::Individual),
            AuthAction::SetRegistrationField(RegistrationField::NameOrCompany, "Ji-woo Park".into()),
            AuthAction::SetRegistrationField(RegistrationField::TaxId, "123.456.789-00".into()),
            AuthAction::SetRegistrationField(RegistrationField::Phone, "(11) 98888-7777".into()),
            AuthAction::SetRegistrationField(RegistrationField::Email, "jiwoo@example.com".into()),
            AuthAction::SetRegistrationField(RegistrationField::Password, "segredo".into()),
            AuthAction::SetRegistrationField(RegistrationField::ConfirmPassword, "segredo".into()),
            AuthAction::SetAcceptedTerms(true),
        ]
        .into_iter()
        .fold(AuthForm::new(), AuthForm::reduce)
    }

    fn page() -> (AuthPage, NotificationLog, NavigationLog) {
        let notes = NotificationLog::new();
        let nav = NavigationLog::new();
        let ctx = AppContext::in_memory(Arc::new(notes.clone()), Arc::new(nav.clone()));
        (AuthPage::new(ctx), notes, nav)
    }

    #[test]
    fn sign_in_needs_both_fields() {
        let cases = [("", ""), ("(11) 99999-9999", ""), ("", "senha")];
        for (phone, password) in cases {
            let login = LoginCredentials {
                phone: phone.to_string(),
                password: password.to_string(),
            };
            assert_eq!(
                validate_sign_in(&login),
                Err(ValidationError::MissingCredentials)
            );
        }
    }

    #[test]
    fn unchecked_terms_beat_everything_else() {
        let form = filled_sign_up()
            .reduce(AuthAction::SetAcceptedTerms(false))
            .reduce(AuthAction::SetRegistrationField(
                RegistrationField::ConfirmPassword,
                "outra".into(),
            ));
        assert_eq!(validate_sign_up(&form), Err(ValidationError::TermsNotAccepted));
    }

    #[test]
    fn password_mismatch_is_reported_before_missing_fields() {
        let form = filled_sign_up()
            .reduce(AuthAction::SetRegistrationField(RegistrationField::Email, String::new()))
            .reduce(AuthAction::SetRegistrationField(
                RegistrationField::ConfirmPassword,
                "segredo2".into(),
            ));
        assert_eq!(validate_sign_up(&form), Err(ValidationError::PasswordMismatch));
    }

    #[test]
    fn each_required_field_is_checked() {
        for field in [
            RegistrationField::NameOrCompany,
            RegistrationField::TaxId,
            RegistrationField::Phone,
            RegistrationField::Email,
        ] {
            let form = filled_sign_up().reduce(AuthAction::SetRegistrationField(field, String::new()));
            assert_eq!(
                validate_sign_up(&form),
                Err(ValidationError::IncompleteRegistration),
                "{field:?}"
            );
        }
        assert_eq!(validate_sign_up(&filled_sign_up()), Ok(()));
    }

    #[test]
    fn switching_person_type_clears_registration() {
        let form = filled_sign_up().reduce(AuthAction::ChoosePersonType(PersonType::Organization));
        assert!(form.registration.is_empty());
        assert_eq!(form.sign_up_screen(), SignUpScreen::Form(PersonType::Organization));
        assert!(form.accepted_terms);

        let again = form.reduce(AuthAction::ChoosePersonType(PersonType::Organization));
        assert!(again.registration.is_empty());
    }

    #[test]
    fn going_back_shows_the_choice_screen() {
        let form = filled_sign_up().reduce(AuthAction::BackToPersonTypeChoice);
        assert_eq!(form.sign_up_screen(), SignUpScreen::ChoosePersonType);
        assert_eq!(validate_sign_up(&form), Err(ValidationError::PersonTypeNotChosen));
    }

    #[test]
    fn labels_follow_person_type() {
        assert_eq!(PersonType::Individual.tax_id_label(), "CPF");
        assert_eq!(PersonType::Organization.name_label(), "Razão Social");
        assert_eq!(PersonType::Organization.tax_id_placeholder(), "00.000.000/0001-00");
    }

    #[tokio::test]
    async fn rejected_sign_in_does_not_navigate_or_set_flag() {
        let (mut page, notes, nav) = page();
        page.dispatch(AuthAction::SetLoginPhone("(11) 99999-9999".into()));

        let outcome = page.submit().await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Rejected(ValidationError::MissingCredentials));
        assert!(nav.history().is_empty());
        assert!(!page.ctx.session.is_authenticated().await.unwrap());
        let note = notes.last().unwrap();
        assert_eq!(note.severity, Severity::Error);
        assert_eq!(note.title, "Preencha telefone e senha.");
    }

    #[tokio::test]
    async fn accepted_sign_in_sets_flag_and_goes_to_dashboard() {
        let (mut page, notes, nav) = page();
        page.dispatch(AuthAction::SetLoginPhone("(11) 99999-9999".into()));
        page.dispatch(AuthAction::SetLoginPassword("senha".into()));

        let outcome = page.submit().await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Accepted(Destination::Dashboard));
        assert_eq!(nav.current(), Some(Destination::Dashboard));
        assert!(page.ctx.session.is_authenticated().await.unwrap());
        assert_eq!(notes.last().unwrap().title, "Login realizado com sucesso!");
    }

    #[test]
    fn back_and_terms_links_navigate() {
        let (page, _notes, nav) = page();
        page.open_terms();
        page.back();
        assert_eq!(nav.history(), vec![Destination::Terms, Destination::Home]);
    }

    #[tokio::test]
    async fn sign_up_submission_uses_the_registration_rules() {
        let (mut page, notes, nav) = page();
        page.dispatch(AuthAction::SwitchMode(AuthMode::SignUp));

        let outcome = page.submit().await.unwrap();
        assert_eq!(outcome.rejection(), Some(&ValidationError::PersonTypeNotChosen));

        page.form = filled_sign_up();
        let outcome = page.submit().await.unwrap();
        assert!(outcome.is_accepted());
        assert_eq!(nav.history(), vec![Destination::Dashboard]);
        assert_eq!(notes.last().unwrap().title, "Cadastro realizado com sucesso!");
    }
}
