mod terminal;

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use haneul_flow::{
    AppContext, AuthAction, AuthMode, AuthPage, BookingAction, BookingForm, CatalogPage,
    CatalogPhase, CustomerType, FileSessionStorage, FlowConfig, JsonCatalog, PersonType,
    RegistrationField, SubmitOutcome,
};
use std::sync::Arc;
use terminal::{TerminalNavigator, TerminalNotifier};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "haneul", about = "Haneul Trip: contas, agendamentos e pacotes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Entrar com telefone e senha
    SignIn {
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Criar uma conta
    SignUp {
        #[arg(long, value_enum)]
        person_type: Option<PersonKind>,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        tax_id: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = "")]
        confirm_password: String,
        #[arg(long)]
        accept_terms: bool,
    },
    /// Calcular o preço de um serviço
    Quote {
        #[arg(long, default_value = "intercambio")]
        service: String,
    },
    /// Confirmar um agendamento no formulário simples
    Book {
        #[arg(long, value_enum, default_value_t = PersonKind::Individual)]
        customer_type: PersonKind,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = "intercambio")]
        service: String,
        /// Valor de um campo datetime-local, ex. 2025-03-10T14:30
        #[arg(long, default_value = "")]
        date_time: String,
        /// Calcular o preço antes de confirmar
        #[arg(long)]
        calculate: bool,
    },
    /// Navegar pelo catálogo de pacotes
    Catalog {
        #[arg(long, default_value = "")]
        search: String,
        /// Abrir os detalhes de um pacote
        #[arg(long)]
        open: Option<u32>,
        /// Solicitar agendamento do pacote aberto
        #[arg(long, requires = "open")]
        book: bool,
        #[arg(long)]
        sign_out: bool,
    },
    /// Mostrar se há uma sessão ativa
    Status,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PersonKind {
    Individual,
    Organization,
}

impl From<PersonKind> for PersonType {
    fn from(kind: PersonKind) -> Self {
        match kind {
            PersonKind::Individual => PersonType::Individual,
            PersonKind::Organization => PersonType::Organization,
        }
    }
}

impl From<PersonKind> for CustomerType {
    fn from(kind: PersonKind) -> Self {
        match kind {
            PersonKind::Individual => CustomerType::Individual,
            PersonKind::Organization => CustomerType::Organization,
        }
    }
}

/// Initialize tracing based on environment variables
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "haneul_cli=info,haneul_flow=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn build_context(config: FlowConfig, navigator: TerminalNavigator) -> AppContext {
    let storage = Arc::new(FileSessionStorage::new(config.storage_path.clone()));
    let catalog_path = config.catalog_path.clone();
    let ctx = AppContext::new(config, storage, Arc::new(TerminalNotifier), Arc::new(navigator));
    match catalog_path {
        Some(path) => {
            info!(path = %path.display(), "Using catalog file");
            ctx.with_catalog(Arc::new(JsonCatalog::new(path)))
        }
        None => ctx,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = FlowConfig::from_env().context("Failed to load configuration")?;
    debug!(?config, "Configuration loaded");

    let ctx = build_context(config, TerminalNavigator);

    match cli.command {
        Command::SignIn { phone, password } => {
            let mut page = AuthPage::new(ctx);
            page.dispatch(AuthAction::SetLoginPhone(phone));
            page.dispatch(AuthAction::SetLoginPassword(password));
            finish_submit(page.submit().await?)
        }
        Command::SignUp {
            person_type,
            name,
            tax_id,
            phone,
            email,
            password,
            confirm_password,
            accept_terms,
        } => {
            let mut page = AuthPage::new(ctx);
            page.dispatch(AuthAction::SwitchMode(AuthMode::SignUp));
            if let Some(kind) = person_type {
                page.dispatch(AuthAction::ChoosePersonType(kind.into()));
            }
            for (field, value) in [
                (RegistrationField::NameOrCompany, name),
                (RegistrationField::TaxId, tax_id),
                (RegistrationField::Phone, phone),
                (RegistrationField::Email, email),
                (RegistrationField::Password, password),
                (RegistrationField::ConfirmPassword, confirm_password),
            ] {
                page.dispatch(AuthAction::SetRegistrationField(field, value));
            }
            page.dispatch(AuthAction::SetAcceptedTerms(accept_terms));
            finish_submit(page.submit().await?)
        }
        Command::Quote { service } => {
            let form = BookingForm::new()
                .reduce(BookingAction::SelectService(service))
                .reduce(BookingAction::CalculatePrice);
            match form.price_line() {
                Some(line) => println!("{line}"),
                None => println!("Serviço sem preço cadastrado."),
            }
            Ok(())
        }
        Command::Book {
            customer_type,
            email,
            password,
            service,
            date_time,
            calculate,
        } => {
            let mut form = [
                BookingAction::SetCustomerType(customer_type.into()),
                BookingAction::SetEmail(email),
                BookingAction::SetPassword(password),
                BookingAction::SelectService(service),
                BookingAction::SetDateTime(date_time),
            ]
            .into_iter()
            .fold(BookingForm::new(), BookingForm::reduce);
            if calculate {
                form = form.reduce(BookingAction::CalculatePrice);
                if let Some(line) = form.price_line() {
                    println!("{line}");
                }
            }
            match form.confirm() {
                Ok(confirmation) => {
                    println!("{}", confirmation.message());
                    Ok(())
                }
                Err(error) => bail!("{error}"),
            }
        }
        Command::Catalog {
            search,
            open,
            book,
            sign_out,
        } => run_catalog(ctx, search, open, book, sign_out).await,
        Command::Status => {
            match ctx.session.get().await? {
                Some(_) => println!("Sessão ativa ({})", ctx.session.key()),
                None => println!("Nenhuma sessão ativa"),
            }
            Ok(())
        }
    }
}

fn finish_submit(outcome: SubmitOutcome) -> Result<()> {
    match outcome {
        SubmitOutcome::Accepted(destination) => {
            info!(route = destination.route(), "Form accepted");
            Ok(())
        }
        SubmitOutcome::Rejected(error) => bail!("{error}"),
    }
}

async fn run_catalog(
    ctx: AppContext,
    search: String,
    open: Option<u32>,
    book: bool,
    sign_out: bool,
) -> Result<()> {
    let mut page = CatalogPage::mount(ctx).await?;

    if page.phase() == CatalogPhase::Redirecting {
        // Keep the page mounted until the redirect fires.
        if let Some(redirect) = page.take_redirect() {
            redirect.wait().await;
        }
        page.unmount();
        return Ok(());
    }

    page.set_search(search);
    let cards = page.cards();
    if cards.is_empty() {
        println!("Nenhum pacote encontrado.");
    }
    for card in &cards {
        let action = if card.view_enabled { "Ver Pacote" } else { "indisponível" };
        println!(
            "#{} {} | {} | {} | {} | {} [{}]",
            card.id, card.title, card.destination, card.duration, card.price, card.badge, action
        );
    }

    if let Some(id) = open {
        if page.open_package(id).await? {
            if let Some(package) = page.selected() {
                println!();
                println!("{} ({})", package.title, package.destination);
                println!("Duração: {}", package.duration);
                println!("Idioma: {}", package.language);
                println!("Preço: {}", package.price);
                println!("Vagas: {}", haneul_flow::catalog::slot_badge(package.remaining_slots));
                println!("Inclui:");
                for item in &package.inclusions {
                    println!("  - {item}");
                }
            }
            if book {
                page.request_booking()?;
            } else {
                page.dismiss();
            }
        }
    }

    if sign_out {
        page.sign_out().await?;
    }
    page.unmount();
    Ok(())
}
