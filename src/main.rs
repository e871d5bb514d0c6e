//! Event administration console
//!
//! Main application entry point

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use tracing::{error, info};

use event_admin::{
    config::Settings,
    handlers::{self, events, participants, ConsoleHost, ScreenSlot},
    models::{EventDraft, ParticipantDraft},
    services::ServiceFactory,
    utils::logging,
    Result,
};

#[derive(Parser, Debug)]
#[command(name = "event-admin", version, about = "Manage events and participants")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Events(EventCommand),
    #[command(subcommand)]
    Participants(ParticipantCommand),
}

#[derive(Subcommand, Debug)]
enum EventCommand {
    /// List events
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one event with its participants
    Show { id: i64 },
    /// Create an event
    Create(EventFields),
    /// Update an event; omitted fields keep their current values
    Edit {
        id: i64,
        #[command(flatten)]
        fields: EventFields,
    },
    /// Delete an event and its participants
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
enum ParticipantCommand {
    /// List participants
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Register a participant
    Create(ParticipantFields),
    /// Update a participant; omitted fields keep their current values
    Edit {
        id: i64,
        #[command(flatten)]
        fields: ParticipantFields,
    },
    /// Delete a participant
    Delete { id: i64 },
}

#[derive(Args, Debug, Default)]
struct EventFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,
    /// HH:MM
    #[arg(long)]
    time: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    organizer: Option<String>,
    #[arg(long)]
    max_participants: Option<String>,
}

impl EventFields {
    fn apply(self, draft: &mut EventDraft) {
        let fields = [
            (self.title, &mut draft.title),
            (self.description, &mut draft.description),
            (self.date, &mut draft.date),
            (self.time, &mut draft.time),
            (self.location, &mut draft.location),
            (self.organizer, &mut draft.organizer),
            (self.max_participants, &mut draft.max_participants),
        ];
        for (value, field) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

#[derive(Args, Debug, Default)]
struct ParticipantFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    event_id: Option<i64>,
}

impl ParticipantFields {
    fn apply(self, draft: &mut ParticipantDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(email) = self.email {
            draft.email = email;
        }
        if let Some(phone) = self.phone {
            draft.phone = phone;
        }
        if let Some(event_id) = self.event_id {
            draft.event_id = Some(event_id);
        }
    }
}

async fn run(command: Command, services: &ServiceFactory, host: &ConsoleHost) -> Result<String> {
    match command {
        Command::Events(command) => match command {
            EventCommand::List { search } => Ok(events::handle_events_list(services, search.as_deref()).await),
            EventCommand::Show { id } => Ok(events::handle_event_detail(services, id).await),
            EventCommand::Create(fields) => {
                let today = chrono::Local::now().date_naive();
                events::handle_event_create(services, today, |draft| fields.apply(draft), host).await
            }
            EventCommand::Edit { id, fields } => {
                events::handle_event_edit(services, id, |draft| fields.apply(draft), host).await
            }
            EventCommand::Delete { id } => events::handle_event_delete(services, id, host).await,
        },
        Command::Participants(command) => match command {
            ParticipantCommand::List { search } => {
                Ok(participants::handle_participants_list(services, search.as_deref()).await)
            }
            ParticipantCommand::Create(fields) => {
                let event_id = fields.event_id;
                participants::handle_participant_create(services, event_id, |draft| fields.apply(draft), host).await
            }
            ParticipantCommand::Edit { id, fields } => {
                participants::handle_participant_edit(services, id, |draft| fields.apply(draft), host).await
            }
            ParticipantCommand::Delete { id } => participants::handle_participant_delete(services, id, host).await,
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::load(cli.config.as_deref())?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on exit
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}", event_admin::info());
    info!(api = %settings.api.base_url, "Using events API");

    let services = ServiceFactory::new(&settings)?;
    let host = ConsoleHost::new(cli.yes);
    let screen = ScreenSlot::new();

    handlers::render_into(&screen, run(cli.command, &services, &host)).await;

    match screen.take() {
        Some(Ok(view)) => println!("{}", view),
        Some(Err(e)) => {
            error!(error = %e, severity = ?e.severity(), "Command failed");
            return Err(e.into());
        }
        None => {}
    }

    if let Some(route) = host.location() {
        println!("Next: {}", route);
    }

    Ok(())
}
