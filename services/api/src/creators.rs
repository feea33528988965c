use crate::infra::{format_created_at, open_directory, read_attachment, DirectoryService};
use clap::{Args, Subcommand};
use matchly::config::AppConfig;
use matchly::directory::export::write_csv;
use matchly::directory::{
    CreatorDashboard, CreatorId, CreatorRecord, DirectoryServiceError, DirectoryView,
    DiscoveryQuery, EmptyState, OnboardingForm,
};
use matchly::error::AppError;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub(crate) enum CreatorsCommand {
    /// Submit a new creator profile with its media kit
    Onboard(OnboardArgs),
    /// List creators the way a brand sees them
    List(ListArgs),
    /// Show one creator profile
    Show { id: String },
    /// Remove a creator and drop them from the shortlist
    Delete { id: String },
    /// Replace a creator's media kit
    ReplaceMediaKit(ReplaceMediaKitArgs),
    /// Write the filtered directory as CSV
    Export(ExportArgs),
}

#[derive(Subcommand, Debug)]
pub(crate) enum ShortlistCommand {
    /// Save or unsave a creator
    Toggle { id: String },
    /// List saved creator ids
    List,
}

#[derive(Args, Debug)]
pub(crate) struct OnboardArgs {
    #[arg(long, default_value = "")]
    pub(crate) name: String,
    #[arg(long, default_value = "")]
    pub(crate) niche: String,
    /// Instagram, TikTok, YouTube, or Twitter/X
    #[arg(long, default_value = "")]
    pub(crate) platform: String,
    #[arg(long, default_value = "")]
    pub(crate) followers: String,
    /// Path to the media kit PDF
    #[arg(long)]
    pub(crate) media_kit: Option<PathBuf>,
    /// Override the content type guessed from the file extension
    #[arg(long)]
    pub(crate) content_type: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ReplaceMediaKitArgs {
    pub(crate) id: String,
    pub(crate) path: PathBuf,
    #[arg(long)]
    pub(crate) content_type: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct FilterArgs {
    /// Case-insensitive niche substring
    #[arg(long)]
    pub(crate) niche: Option<String>,
    #[arg(long)]
    pub(crate) platform: Option<String>,
    #[arg(long)]
    pub(crate) min_followers: Option<String>,
    #[arg(long)]
    pub(crate) max_followers: Option<String>,
    #[arg(long)]
    pub(crate) has_media_kit: bool,
    #[arg(long)]
    pub(crate) saved_only: bool,
    /// recent, most, or least
    #[arg(long)]
    pub(crate) sort: Option<String>,
}

impl FilterArgs {
    pub(crate) fn query(&self) -> DiscoveryQuery {
        DiscoveryQuery {
            niche: self.niche.clone(),
            platform: self.platform.clone(),
            min_followers: self.min_followers.clone(),
            max_followers: self.max_followers.clone(),
            has_media_kit: Some(self.has_media_kit),
            saved_only: Some(self.saved_only),
            sort: self.sort.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
    /// Print the view as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
    /// Destination file; stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_creators(command: CreatorsCommand, config: &AppConfig) -> Result<(), AppError> {
    let service = open_directory(&config.storage)?;

    match command {
        CreatorsCommand::Onboard(args) => onboard(&service, args),
        CreatorsCommand::List(args) => {
            let view = discover(&service, &args.filters)?;
            if args.json {
                let rendered = serde_json::to_string_pretty(&view).map_err(io::Error::from)?;
                println!("{rendered}");
            } else {
                render_view(&view);
            }
            Ok(())
        }
        CreatorsCommand::Show { id } => {
            let id = CreatorId(id);
            let record = service
                .creator(&id)?
                .ok_or(AppError::CreatorNotFound(id))?;
            render_record(&record, false);
            if let Some(report) = service.completeness(&record.id)? {
                println!("  Profile completeness: {}%", report.score);
            }
            Ok(())
        }
        CreatorsCommand::Delete { id } => {
            let id = CreatorId(id);
            let removed = service
                .delete(&id)?
                .ok_or(AppError::CreatorNotFound(id))?;
            println!("Deleted {} ({})", removed.name, removed.id);
            Ok(())
        }
        CreatorsCommand::ReplaceMediaKit(args) => {
            let attachment = read_attachment(&args.path, args.content_type.as_deref())?;
            let id = CreatorId(args.id);
            let updated = match service.replace_media_kit(&id, attachment) {
                Ok(Some(record)) => record,
                Ok(None) => return Err(AppError::CreatorNotFound(id)),
                Err(err) => return Err(report_rejection(err)),
            };
            println!("Media kit updated for {} ({})", updated.name, updated.id);
            Ok(())
        }
        CreatorsCommand::Export(args) => {
            let view = discover(&service, &args.filters)?;
            match args.output {
                Some(path) => {
                    write_csv(&view, BufWriter::new(File::create(&path)?))?;
                    println!("Exported {} creators to {}", view.visible, path.display());
                }
                None => write_csv(&view, io::stdout().lock())?,
            }
            Ok(())
        }
    }
}

pub(crate) fn run_shortlist(command: ShortlistCommand, config: &AppConfig) -> Result<(), AppError> {
    let service = open_directory(&config.storage)?;

    match command {
        ShortlistCommand::Toggle { id } => {
            let outcome = service.toggle_saved(&CreatorId(id))?;
            let verb = if outcome.saved { "Saved" } else { "Removed" };
            println!(
                "{verb} {} | {} creators on the shortlist",
                outcome.creator_id, outcome.saved_count
            );
        }
        ShortlistCommand::List => {
            let saved = service.saved()?;
            if saved.is_empty() {
                println!("The shortlist is empty.");
            }
            for id in saved.iter() {
                println!("- {id}");
            }
        }
    }
    Ok(())
}

pub(crate) fn run_profile(config: &AppConfig) -> Result<(), AppError> {
    let service = open_directory(&config.storage)?;
    match service.dashboard()? {
        Some(dashboard) => render_dashboard(&dashboard),
        None => println!("No creator profile yet. Run `creators onboard` to create one."),
    }
    Ok(())
}

fn onboard(service: &DirectoryService, args: OnboardArgs) -> Result<(), AppError> {
    let attachment = args
        .media_kit
        .as_deref()
        .map(|path| read_attachment(path, args.content_type.as_deref()))
        .transpose()?;
    let form = OnboardingForm {
        name: args.name,
        niche: args.niche,
        platform: args.platform,
        followers: args.followers,
    };

    let record = service.onboard(form, attachment).map_err(report_rejection)?;
    println!("Welcome aboard, {}!", record.name);
    render_record(&record, false);
    Ok(())
}

fn discover(service: &DirectoryService, filters: &FilterArgs) -> Result<DirectoryView, AppError> {
    let query = filters.query();
    Ok(service.discover(&query.criteria(), query.sort_mode())?)
}

/// Prints validation messages one per line before handing the error back.
fn report_rejection(err: DirectoryServiceError) -> AppError {
    if let DirectoryServiceError::Validation(errors) = &err {
        eprintln!("Profile rejected:");
        for message in errors.messages() {
            eprintln!("- {message}");
        }
    }
    AppError::from(err)
}

pub(crate) fn render_view(view: &DirectoryView) {
    println!(
        "{} of {} creators | {} saved | sorted by {}",
        view.visible,
        view.total,
        view.saved_count,
        view.sort.label()
    );
    match view.empty_state {
        Some(EmptyState::NoCreators) => println!("No creators have joined yet."),
        Some(EmptyState::NoMatches) => println!("No creators match these filters."),
        None => {
            for card in &view.creators {
                render_record(&card.record, card.saved);
            }
        }
    }
}

pub(crate) fn render_dashboard(dashboard: &CreatorDashboard) {
    let profile = &dashboard.profile;
    println!("Dashboard for {}", profile.name);
    render_record(profile, false);
    println!("  Profile completeness: {}%", dashboard.completeness.score);
    if !dashboard.completeness.missing.is_empty() {
        let missing: Vec<&str> = dashboard
            .completeness
            .missing
            .iter()
            .map(|field| field.label())
            .collect();
        println!("  Still missing: {}", missing.join(", "));
    }
    let media_kit = match (&profile.media_kit, &dashboard.media_kit_preview) {
        (Some(_), Some(_)) => "uploaded, preview available",
        (Some(_), None) => "on file, preview unavailable",
        (None, _) => "not uploaded",
    };
    println!("  Media kit: {media_kit}");
}

fn render_record(record: &CreatorRecord, saved: bool) {
    let marker = if saved { "*" } else { "-" };
    let platform = match record.platform_label() {
        "" => "no platform",
        label => label,
    };
    println!(
        "{marker} {} [{}] {} | {} | {} followers | media kit: {} | added {}",
        record.name,
        record.id,
        record.niche,
        platform,
        record.followers,
        if record.has_media_kit() { "yes" } else { "no" },
        format_created_at(record.created_at)
    );
}
