//! Scheduler CLI - list, chart and edit appointments on a scheduling backend.

use std::io;
use std::process::ExitCode;

use chrono::{DateTime, Duration, Local, Utc};
use clap::{Parser, Subcommand};
use scheduler_app::connection::wait_for_backend;
use scheduler_app::error::{AppError, Result};
use scheduler_app::input::{format_local, parse_datetime};
use scheduler_app::pages::recurrence::render_presets;
use scheduler_app::pages::{AppointmentPage, HomePage, RecurrencePage};
use scheduler_app::views::{self, DisplayMode, Theme};
use scheduler_app::{logging, AppConfig, AppointmentService, GlobalArgs};
use scheduler_core::chart::DEFAULT_MAX_ITEMS;
use scheduler_core::{ApiError, AppointmentDraft, DateFilterKey, RecurrenceRule, TaskDraft, TaskListState};

/// Appointment scheduler client
#[derive(Parser)]
#[command(name = "scheduler")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List appointments starting in a date window
    List {
        /// today, week, month or all
        #[arg(short, long, default_value = "all")]
        filter: DateFilterKey,

        /// Show details and recurrence for each appointment
        #[arg(long)]
        full: bool,

        /// Also chart time per title for the same window
        #[arg(long)]
        chart: bool,
    },

    /// Chart time spent per title in a date window
    Chart {
        /// today, week, month or all
        #[arg(short, long, default_value = "today")]
        filter: DateFilterKey,

        /// Number of bars to show
        #[arg(long, default_value_t = DEFAULT_MAX_ITEMS)]
        max_items: usize,

        /// Width of the widest bar
        #[arg(long, default_value_t = 40)]
        width: usize,

        /// Also print the exact duration of each bar
        #[arg(long)]
        tooltips: bool,
    },

    /// Create an appointment
    Create {
        title: String,

        /// Start, as YYYY-MM-DDTHH:MM local time or RFC 3339 (default: now)
        #[arg(long)]
        start: Option<String>,

        /// End (default: one hour after start)
        #[arg(long)]
        end: Option<String>,

        /// Task to add to the new appointment (repeatable)
        #[arg(long = "task", value_name = "DESCRIPTION")]
        tasks: Vec<String>,
    },

    /// Show an appointment and its tasks
    Show {
        id: String,

        /// Print the appointment as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change an appointment's title or times
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,
    },

    /// Delete an appointment
    Delete {
        id: String,

        /// Delete every appointment in its recurring series
        #[arg(long)]
        series: bool,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage an appointment's tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Turn an appointment into a recurring series
    Recur {
        /// Appointment to repeat; omit to list the preset rules
        id: Option<String>,

        /// Rule such as FREQ=DAILY;COUNT=5 (default: weekly, 3 occurrences)
        #[arg(long)]
        rule: Option<RecurrenceRule>,
    },

    /// Show a recurring series
    Series {
        /// Series head or any of its instances
        id: String,

        /// Delete the whole series
        #[arg(long, conflicts_with = "remove")]
        delete: bool,

        /// Delete a single instance of the series
        #[arg(long, value_name = "INSTANCE_ID")]
        remove: Option<String>,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Check that the backend is reachable
    Ping {
        /// Probes to try, three seconds apart
        #[arg(long, default_value_t = 1)]
        attempts: u32,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a task
    Add {
        appointment_id: String,
        description: String,
    },

    /// Mark a task completed
    Done {
        appointment_id: String,
        task_id: String,
    },

    /// Mark a task not completed
    Undo {
        appointment_id: String,
        task_id: String,
    },

    /// Delete a task
    Rm {
        appointment_id: String,
        task_id: String,
    },

    /// Show a single task as the server has it
    Show {
        appointment_id: String,
        task_id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Missing .env is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = AppConfig::from(&cli.global);
    let theme = Theme::install(config.color);
    logging::init(config.verbose, theme.color());

    match run(cli.command, &config, theme).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", views::render_error_banner(&e.to_string(), theme));
            if let AppError::Api(api) = &e {
                if api.is_connectivity() {
                    eprintln!("{}", views::render_disconnected(&config.api_url, theme));
                } else if api.is_not_found() {
                    eprintln!("{}", theme.muted("Run `scheduler list` to see appointment ids."));
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &AppConfig, theme: &Theme) -> Result<()> {
    let service = AppointmentService::from_config(config)?;

    match command {
        Commands::List { filter, full, chart } => cmd_list(&service, filter, full, chart, theme).await,

        Commands::Chart {
            filter,
            max_items,
            width,
            tooltips,
        } => cmd_chart(&service, filter, max_items, width, tooltips, theme).await,

        Commands::Create {
            title,
            start,
            end,
            tasks,
        } => cmd_create(&service, title, start, end, tasks, theme).await,

        Commands::Show { id, json } => cmd_show(&service, &id, json, theme).await,

        Commands::Edit {
            id,
            title,
            start,
            end,
        } => cmd_edit(&service, &id, title, start, end, theme).await,

        Commands::Delete { id, series, yes } => cmd_delete(&service, &id, series, yes, theme).await,

        Commands::Task(task) => cmd_task(&service, task, config, theme).await,

        Commands::Recur { id, rule } => cmd_recur(&service, id, rule, theme).await,

        Commands::Series {
            id,
            delete,
            remove,
            yes,
        } => cmd_series(&service, &id, delete, remove, yes, theme).await,

        Commands::Ping { attempts } => cmd_ping(&service, attempts, theme).await,
    }
}

async fn cmd_list(
    service: &AppointmentService,
    filter: DateFilterKey,
    full: bool,
    chart: bool,
    theme: &Theme,
) -> Result<()> {
    let today = Local::now().date_naive();
    let page = if chart {
        HomePage::load(service, filter, today).await?
    } else {
        HomePage::load_list(service, filter, today).await?
    };
    let mode = if full { DisplayMode::Full } else { DisplayMode::Compact };
    println!("{}", page.render_list(&Local, Utc::now(), mode, theme));
    if chart {
        println!();
        println!("{}", views::render_chart(page.groups(), DEFAULT_MAX_ITEMS, 40, theme));
    }
    Ok(())
}

async fn cmd_chart(
    service: &AppointmentService,
    filter: DateFilterKey,
    max_items: usize,
    width: usize,
    tooltips: bool,
    theme: &Theme,
) -> Result<()> {
    let page = HomePage::load_chart(service, filter, Local::now().date_naive()).await?;
    println!("{}", page.render_chart(max_items, width, theme));
    if tooltips {
        println!();
        for line in views::render_tooltips(page.groups(), max_items) {
            println!("{}", theme.muted(&line));
        }
    }
    Ok(())
}

async fn cmd_create(
    service: &AppointmentService,
    title: String,
    start: Option<String>,
    end: Option<String>,
    tasks: Vec<String>,
    theme: &Theme,
) -> Result<()> {
    let mut draft = AppointmentDraft::starting_at(Utc::now());
    draft.title = title;
    if let Some(start) = start.as_deref() {
        draft.start = parse_datetime(start)?;
        draft.end = draft.start + Duration::hours(1);
    }
    if let Some(end) = end.as_deref() {
        draft.end = parse_datetime(end)?;
    }
    // Reject blank tasks before anything is created.
    for description in &tasks {
        TaskDraft::new(description.as_str()).into_new_task()?;
    }

    let mut home = HomePage::new(DateFilterKey::All, Local::now().date_naive());
    let created = home.create(service, draft).await?;
    let id = created.id.clone().ok_or_else(|| AppError::MissingId {
        title: created.title.clone(),
    })?;
    println!(
        "{}",
        views::render_success(
            &format!(
                "Created \"{}\" ({id}) from {} to {}",
                created.title,
                format_local(created.start, &Local),
                format_local(created.end, &Local)
            ),
            theme
        )
    );
    let appointment = if tasks.is_empty() {
        created
    } else {
        for description in tasks {
            home.add_task(service, &id, TaskDraft::new(description)).await?;
        }
        home.refresh(service, &id).await?
    };
    let page = AppointmentPage::from_appointment(appointment);
    println!("{}", page.render(&Local, Utc::now(), theme));
    Ok(())
}

async fn cmd_show(service: &AppointmentService, id: &str, json: bool, theme: &Theme) -> Result<()> {
    let page = AppointmentPage::load(service, id).await?;
    if json {
        let out = serde_json::to_string_pretty(page.appointment())
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        println!("{out}");
    } else {
        println!("{}", page.render(&Local, Utc::now(), theme));
    }
    Ok(())
}

async fn cmd_edit(
    service: &AppointmentService,
    id: &str,
    title: Option<String>,
    start: Option<String>,
    end: Option<String>,
    theme: &Theme,
) -> Result<()> {
    let start = parse_optional(start.as_deref())?;
    let end = parse_optional(end.as_deref())?;
    let mut page = AppointmentPage::load(service, id).await?;
    page.edit(service, title, start, end).await?;
    println!("{}", views::render_success("Appointment updated", theme));
    println!("{}", page.render(&Local, Utc::now(), theme));
    Ok(())
}

async fn cmd_delete(
    service: &AppointmentService,
    id: &str,
    series: bool,
    yes: bool,
    theme: &Theme,
) -> Result<()> {
    let page = AppointmentPage::load(service, id).await?;
    if series {
        confirm_or_cancel(
            &format!("Delete every appointment in the \"{}\" series?", page.appointment().title),
            yes,
        )?;
    }
    let ack = page.delete(service, series).await?;
    let message = ack.message.unwrap_or_else(|| "Appointment deleted".to_string());
    println!("{}", views::render_success(&message, theme));
    Ok(())
}

async fn cmd_task(
    service: &AppointmentService,
    command: TaskCommands,
    config: &AppConfig,
    theme: &Theme,
) -> Result<()> {
    match command {
        TaskCommands::Add {
            appointment_id,
            description,
        } => {
            let mut page = AppointmentPage::load(service, &appointment_id).await?;
            let task = page.add_task(service, TaskDraft::new(description)).await?;
            println!(
                "{}",
                views::render_success(
                    &format!("Added \"{}\" ({})", task.description, task.id.as_deref().unwrap_or("no id")),
                    theme
                )
            );
            println!("{}", views::render_task_list(page.tasks(), theme));
        }

        TaskCommands::Done {
            appointment_id,
            task_id,
        } => set_completed(service, &appointment_id, &task_id, true, config, theme).await?,

        TaskCommands::Undo {
            appointment_id,
            task_id,
        } => set_completed(service, &appointment_id, &task_id, false, config, theme).await?,

        TaskCommands::Rm {
            appointment_id,
            task_id,
        } => {
            let mut page = AppointmentPage::load(service, &appointment_id).await?;
            page.remove_task(service, &task_id).await?;
            println!("{}", views::render_success("Task deleted", theme));
            println!("{}", views::render_task_list(page.tasks(), theme));
        }

        TaskCommands::Show {
            appointment_id,
            task_id,
        } => {
            let page = AppointmentPage::load(service, &appointment_id).await?;
            let task = page.task(service, &task_id).await?;
            let checkbox = if task.completed { "[x]" } else { "[ ]" };
            println!("{checkbox} {}  {}", task.description, theme.muted(&format!("({task_id})")));
        }
    }
    Ok(())
}

/// Toggle a task, printing the list each time it visibly changes.
async fn set_completed(
    service: &AppointmentService,
    appointment_id: &str,
    task_id: &str,
    completed: bool,
    config: &AppConfig,
    theme: &Theme,
) -> Result<()> {
    let mut page = AppointmentPage::load(service, appointment_id).await?;
    let mut changes = 0;
    page.set_task_completed(service, task_id, completed, config.task_mode, |tasks| {
        if changes > 0 {
            println!();
        }
        changes += 1;
        println!("{}", views::render_task_list(&TaskListState::new(tasks.to_vec()), theme));
    })
    .await?;
    Ok(())
}

async fn cmd_recur(
    service: &AppointmentService,
    id: Option<String>,
    rule: Option<RecurrenceRule>,
    theme: &Theme,
) -> Result<()> {
    let Some(id) = id else {
        println!("{}", render_presets(theme));
        return Ok(());
    };
    let rule = rule.unwrap_or_default();
    let page = RecurrencePage::apply(service, &id, &rule).await?;
    println!("{}", views::render_success(&format!("Applied {}", rule.label()), theme));
    println!("{}", page.render(&Local, Utc::now(), theme));
    Ok(())
}

async fn cmd_series(
    service: &AppointmentService,
    id: &str,
    delete: bool,
    remove: Option<String>,
    yes: bool,
    theme: &Theme,
) -> Result<()> {
    let mut page = RecurrencePage::load(service, id).await?;
    if let Some(instance_id) = remove {
        let removed = page.remove_instance(service, &instance_id).await?;
        println!(
            "{}",
            views::render_success(
                &format!("Removed {} on {}", removed.title, format_local(removed.start, &Local)),
                theme
            )
        );
        println!("{}", page.render(&Local, Utc::now(), theme));
        return Ok(());
    }
    if !delete {
        println!("{}", page.render(&Local, Utc::now(), theme));
        return Ok(());
    }
    confirm_or_cancel(
        &format!(
            "Delete all {} appointments in the \"{}\" series?",
            page.instances().len(),
            page.parent().title
        ),
        yes,
    )?;
    let removed = page.delete_series(service).await?;
    println!(
        "{}",
        views::render_success(&format!("Deleted series ({removed} appointments)"), theme)
    );
    Ok(())
}

async fn cmd_ping(service: &AppointmentService, attempts: u32, theme: &Theme) -> Result<()> {
    if wait_for_backend(service, attempts).await {
        println!(
            "{}",
            views::render_success(&format!("Connected to {}", service.base_url()), theme)
        );
        Ok(())
    } else {
        Err(AppError::Disconnected {
            url: service.base_url().to_string(),
        })
    }
}

fn parse_optional(input: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    Ok(input.map(parse_datetime).transpose()?)
}

fn confirm_or_cancel(prompt: &str, yes: bool) -> Result<()> {
    if yes {
        return Ok(());
    }
    let stdin = io::stdin();
    if views::confirm(prompt, &mut stdin.lock(), &mut io::stdout())? {
        Ok(())
    } else {
        Err(AppError::Cancelled)
    }
}
