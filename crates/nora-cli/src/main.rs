//! `nora` — command-line front end for the nora grade tracker.
//!
//! Reads `nora.toml` (or the path given with `--config`), opens the data and
//! secret stores, passes the session gate and runs one command.
//!
//! # Usage
//!
//! ```text
//! nora subjects add --name Maths --year 2025/26 --exams 4
//! nora grade <ID> 0 2,5
//! nora summary --year 2025/26
//! nora pin enable
//! ```
//!
//! PINs are read line by line from stdin.

mod render;
mod settings;

use std::{
  io::{self, BufRead, Write},
  path::Path,
  sync::Arc,
};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use nora_app::{
  session::{SessionGate, SessionState},
  settings::{PinEvent, PinSettings, PinStep},
  subjects::{GradeUpdate, SubjectStore},
  toast::ToastSlot,
};
use nora_core::{
  grade::GradeCategory,
  pin::Pin,
  store::{KeyValueStore, SESSION_KEY},
  subject::{NewSubject, SubjectId},
};
use nora_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::CliConfig;

type Gate = SessionGate<SqliteStore, SqliteStore, ToastSlot>;
type Settings = PinSettings<SqliteStore, ToastSlot>;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "nora", version, about = "Track school grades per subject")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "nora.toml")]
  config: std::path::PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Show whether a session is stored and whether a PIN is set.
  Status,
  /// List, add or delete subjects.
  #[command(subcommand)]
  Subjects(SubjectsCommand),
  /// Set one grade slot. An empty or unreadable VALUE clears the slot.
  Grade {
    id:       String,
    /// Zero-based slot index.
    slot:     usize,
    value:    String,
    #[arg(long, default_value_t = GradeCategory::Exam)]
    category: GradeCategory,
  },
  /// Subject count, average and strongest subject per school year.
  Summary {
    #[arg(long)]
    year: Option<String>,
  },
  /// List the school years that have subjects.
  Years,
  /// Set, change or remove the PIN.
  #[command(subcommand)]
  Pin(PinCommand),
  /// End the stored session.
  Logout,
  /// Delete every subject and grade.
  Reset {
    /// Confirm the deletion.
    #[arg(long)]
    yes: bool,
  },
}

#[derive(Subcommand)]
enum SubjectsCommand {
  List {
    #[arg(long)]
    year: Option<String>,
  },
  Add {
    #[arg(long)]
    name:    String,
    #[arg(long)]
    year:    String,
    #[arg(long, default_value = "#6366f1")]
    color:   String,
    /// Number of exam grade slots.
    #[arg(long, default_value_t = 0)]
    exams:   usize,
    /// Number of report grade slots.
    #[arg(long, default_value_t = 0)]
    reports: usize,
    /// Number of oral grade slots.
    #[arg(long, default_value_t = 0)]
    orals:   usize,
  },
  Delete {
    id: String,
  },
}

#[derive(Subcommand)]
enum PinCommand {
  /// Set a new PIN, replacing any existing one.
  Enable,
  /// Remove the PIN after confirming it.
  Disable,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = CliConfig::load(&cli.config)?;

  let kv = Arc::new(open_store(&cfg.data_path).await?);
  let secrets = Arc::new(open_store(&cfg.secrets_path).await?);
  let toasts = Arc::new(ToastSlot::new());

  if let Command::Status = cli.command {
    return status(kv, secrets, toasts).await;
  }

  let mut gate = SessionGate::new(kv.clone(), secrets, toasts.clone());
  sign_in(&mut gate, &toasts).await?;

  let result = match cli.command {
    Command::Status => Ok(()),
    Command::Subjects(cmd) => subjects(cmd, SubjectStore::new(kv)).await,
    Command::Grade { id, slot, value, category } => {
      grade(SubjectStore::new(kv), id.into(), slot, &value, category).await
    }
    Command::Summary { year } => summary(SubjectStore::new(kv), year).await,
    Command::Years => {
      let mut store = SubjectStore::new(kv);
      store.load().await;
      for year in store.school_years() {
        println!("{year}");
      }
      Ok(())
    }
    Command::Pin(cmd) => {
      let mut settings = gate.pin_settings();
      settings.load().await;
      match cmd {
        PinCommand::Enable => enable_pin(&mut settings, &toasts).await,
        PinCommand::Disable => disable_pin(&mut settings, &toasts).await,
      }
    }
    Command::Logout => {
      gate.sign_out().await;
      println!("signed out");
      Ok(())
    }
    Command::Reset { yes } => reset(SubjectStore::new(kv), yes).await,
  };

  render::flush(&toasts);
  result
}

/// Open a SQLite store, creating its parent directory first.
async fn open_store(path: &Path) -> anyhow::Result<SqliteStore> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  SqliteStore::open(path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

// ─── Session ──────────────────────────────────────────────────────────────────

async fn status(
  kv: Arc<SqliteStore>,
  secrets: Arc<SqliteStore>,
  toasts: Arc<ToastSlot>,
) -> anyhow::Result<()> {
  let session = kv.get(SESSION_KEY).await.context("failed to read session")?;
  let mut settings = PinSettings::new(secrets, toasts.clone());
  settings.load().await;
  render::flush(&toasts);

  println!("session: {}", if session.is_some() { "stored" } else { "none" });
  println!("pin:     {}", if settings.pin_enabled() { "enabled" } else { "disabled" });
  Ok(())
}

/// Boot the gate and, while it asks for one, read PINs from stdin.
async fn sign_in(gate: &mut Gate, toasts: &ToastSlot) -> anyhow::Result<()> {
  gate.boot().await;
  render::flush(toasts);

  while gate.state() == SessionState::AwaitingPinEntry {
    let Some(pin) = prompt_pin("PIN")? else {
      bail!("no PIN entered");
    };
    for c in pin.as_str().chars() {
      gate.type_char(c).await;
    }
    render::flush(toasts);
  }
  Ok(())
}

/// Prompt on stderr until a well-formed PIN is entered. `None` on EOF.
fn prompt_pin(label: &str) -> anyhow::Result<Option<Pin>> {
  let stdin = io::stdin();
  loop {
    eprint!("{label}: ");
    io::stderr().flush().ok();

    let mut line = String::new();
    if stdin.lock().read_line(&mut line)? == 0 {
      return Ok(None);
    }
    match Pin::parse(line.trim()) {
      Ok(pin) => return Ok(Some(pin)),
      Err(e) => eprintln!("{e}"),
    }
  }
}

// ─── PIN settings ─────────────────────────────────────────────────────────────

async fn feed(settings: &mut Settings, pin: &Pin) -> Option<PinEvent> {
  let mut event = None;
  for c in pin.as_str().chars() {
    event = settings.type_char(c).await;
  }
  event
}

async fn enable_pin(settings: &mut Settings, toasts: &ToastSlot) -> anyhow::Result<()> {
  settings.toggle(true);
  while settings.step() != PinStep::Closed {
    let label = match settings.step() {
      PinStep::ConfirmNew => "Confirm PIN",
      _ => "New PIN",
    };
    let Some(pin) = prompt_pin(label)? else {
      settings.cancel();
      bail!("cancelled; PIN unchanged");
    };
    let event = feed(settings, &pin).await;
    render::flush(toasts);
    if event == Some(PinEvent::StorageFailed) {
      settings.cancel();
      bail!("could not save PIN");
    }
  }
  Ok(())
}

async fn disable_pin(settings: &mut Settings, toasts: &ToastSlot) -> anyhow::Result<()> {
  if !settings.pin_enabled() {
    println!("no PIN is set");
    return Ok(());
  }

  settings.toggle(false);
  while settings.step() != PinStep::Closed {
    let Some(pin) = prompt_pin("Current PIN")? else {
      settings.cancel();
      bail!("cancelled; PIN unchanged");
    };
    let event = feed(settings, &pin).await;
    render::flush(toasts);
    if event == Some(PinEvent::StorageFailed) {
      settings.cancel();
      bail!("could not remove PIN");
    }
  }
  Ok(())
}

// ─── Subjects ─────────────────────────────────────────────────────────────────

async fn subjects(
  cmd: SubjectsCommand,
  mut store: SubjectStore<SqliteStore>,
) -> anyhow::Result<()> {
  store.load().await;

  match cmd {
    SubjectsCommand::List { year } => {
      let listed: Vec<_> = match &year {
        Some(year) => store.in_school_year(year).collect(),
        None => store.subjects().iter().collect(),
      };
      if listed.is_empty() {
        println!("no subjects");
      }
      for subject in listed {
        println!("{}", render::subject(subject));
      }
    }
    SubjectsCommand::Add { name, year, color, exams, reports, orals } => {
      let name = name.trim();
      if name.is_empty() {
        bail!("subject name must not be empty");
      }
      let draft = NewSubject {
        name:               name.to_owned(),
        school_year:        year,
        accent_color:       color,
        exam_grade_count:   exams,
        report_grade_count: reports,
        oral_grade_count:   orals,
      };
      let Some(subject) = store.add_subject(draft).await else {
        bail!("could not save subject");
      };
      println!("{}", subject.id);
    }
    SubjectsCommand::Delete { id } => {
      let id = SubjectId::from(id);
      if store.get(&id).is_none() {
        bail!("no subject with id {id}");
      }
      if !store.delete_subject(&id).await {
        bail!("could not delete subject {id}");
      }
      println!("deleted {id}");
    }
  }
  Ok(())
}

async fn grade(
  mut store: SubjectStore<SqliteStore>,
  id: SubjectId,
  slot: usize,
  value: &str,
  category: GradeCategory,
) -> anyhow::Result<()> {
  store.load().await;

  match store.update_grade(&id, slot, value, category).await {
    GradeUpdate::Updated { previous, value } => {
      println!(
        "{category} #{slot}: {} -> {}",
        render::grade(previous),
        render::grade(value)
      );
      Ok(())
    }
    GradeUpdate::SubjectNotFound => bail!("no subject with id {id}"),
    GradeUpdate::SlotOutOfRange => {
      bail!("slot {slot} is out of range for {category} grades")
    }
    GradeUpdate::NotPersisted => bail!("could not save grade"),
  }
}

async fn summary(
  mut store: SubjectStore<SqliteStore>,
  year: Option<String>,
) -> anyhow::Result<()> {
  store.load().await;

  let years: Vec<String> = match year {
    Some(year) => vec![year],
    None => store.school_years().into_iter().map(str::to_owned).collect(),
  };
  if years.is_empty() {
    println!("no subjects");
  }
  for year in years {
    println!("{}", render::summary(&store.summary(&year)));
  }
  Ok(())
}

async fn reset(mut store: SubjectStore<SqliteStore>, yes: bool) -> anyhow::Result<()> {
  if !yes {
    bail!("refusing to delete all data without --yes");
  }
  if !store.delete_all_data().await {
    bail!("could not delete data");
  }
  println!("all subjects deleted");
  Ok(())
}
