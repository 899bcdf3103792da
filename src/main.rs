// Post Calendar
// Command line front end for the scheduling calendar

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use post_calendar::calendar::draggable::DraggableItem;
use post_calendar::calendar::CalendarBoard;
use post_calendar::models::settings::Settings;
use post_calendar::services::posts::{HttpPostApi, PostApi};
use post_calendar::services::reschedule::RescheduleRequest;
use post_calendar::services::settings::SettingsService;
use post_calendar::utils::date::{first_of_month, parse_date_key};

#[derive(Parser)]
#[command(name = "post-calendar")]
#[command(about = "Browse and reschedule social media posts on a calendar")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a month grid of scheduled posts
    Month {
        /// Month to show as YYYY-MM (defaults to the current month)
        month: Option<String>,
    },
    /// Print one day hour by hour, plus posts that have no schedule yet
    Day {
        /// Day to show as YYYY-MM-DD (defaults to today)
        date: Option<String>,
    },
    /// Move a post to another day, keeping its time of day
    Move {
        id: String,
        /// Target day as YYYY-MM-DD
        date: String,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    log::info!("Using backend {}", settings.api_base_url);

    match &cli.command {
        Command::Month { month } => show_month(&settings, month.as_deref()),
        Command::Day { date } => show_day(&settings, date.as_deref()),
        Command::Move { id, date } => move_post(&settings, id, date),
        Command::Config => {
            print!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let service = match &cli.config {
        Some(path) => SettingsService::new(path.clone()),
        None => SettingsService::from_default_location()?,
    };

    let mut settings = service.get()?;
    if let Some(url) = &cli.api_url {
        settings.api_base_url = url.clone();
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid --api-url: {}", e))?;
    }
    Ok(settings)
}

fn parse_month(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        None => Ok(first_of_month(Local::now().date_naive())),
        Some(month) => NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
            .with_context(|| format!("Month must look like 2024-03, got {:?}", month)),
    }
}

fn show_month(settings: &Settings, month: Option<&str>) -> Result<()> {
    let anchor = parse_month(month)?;
    let api = HttpPostApi::from_settings(settings)?;
    let mut board = CalendarBoard::new(Arc::new(api), settings.clone(), anchor);
    board.load().context("Failed to load posts")?;

    let today = Local::now().date_naive();
    println!("{}", anchor.format("%B %Y"));

    for week in board.month_cells(today).chunks(7) {
        for cell in week.iter().filter(|cell| cell.in_current_month) {
            let preview = cell.previews(board.preview_limit());
            if preview.items.is_empty() && !cell.today {
                continue;
            }

            let marker = if cell.today { " (today)" } else { "" };
            println!("  {}{}", cell.date.format("%a %d"), marker);
            for item in preview.items {
                println!("    {}", DraggableItem::new(item).label());
            }
            if let Some(overflow) = &preview.overflow {
                println!("    {}", overflow);
            }
        }
    }

    Ok(())
}

fn show_day(settings: &Settings, date: Option<&str>) -> Result<()> {
    let day = match date {
        None => Local::now().date_naive(),
        Some(value) => parse_date_key(value)
            .ok_or_else(|| anyhow!("Date must look like 2024-03-15, got {:?}", value))?,
    };

    let api = HttpPostApi::from_settings(settings)?;
    let mut board = CalendarBoard::new(Arc::new(api), settings.clone(), first_of_month(day));
    board.load().context("Failed to load posts")?;

    println!("{}", day.format("%A %d %B %Y"));
    for slot in board.day_slots(day).iter().filter(|slot| !slot.items.is_empty()) {
        println!("  {}", slot.label());
        for item in &slot.items {
            println!("    {}", DraggableItem::new(item).label());
        }
    }

    let drafts = board.unscheduled();
    if !drafts.is_empty() {
        println!("Unscheduled");
        for item in drafts {
            println!("    {}", DraggableItem::new(item).label());
        }
    }

    Ok(())
}

fn move_post(settings: &Settings, id: &str, date: &str) -> Result<()> {
    let target = parse_date_key(date)
        .ok_or_else(|| anyhow!("Date must look like 2024-03-15, got {:?}", date))?;

    let api = HttpPostApi::from_settings(settings)?;
    let posts = api.list_posts().context("Failed to load posts")?;
    let item = posts
        .iter()
        .find(|item| item.id == id)
        .ok_or_else(|| anyhow!("No post with id {}", id))?;

    if item.is_scheduled_on(target) {
        println!("\"{}\" is already scheduled on {}", item.title, target);
        return Ok(());
    }

    let request = RescheduleRequest::for_drop(item, target, settings.default_time())
        .ok_or_else(|| anyhow!("The time of day does not exist on {}", target))?;

    api.reschedule(&request.item_id, request.scheduled_at)
        .with_context(|| format!("Failed to reschedule post {}", id))?;

    println!(
        "Moved \"{}\" to {}",
        item.title,
        request.scheduled_at.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}
