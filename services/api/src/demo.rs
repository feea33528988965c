use crate::creators::{render_dashboard, render_view};
use clap::Args;
use matchly::directory::{
    Attachment, CreatorDirectoryService, CreatorId, DirectoryServiceError, DiscoveryQuery,
    MemoryBlobStore, MemoryStore, OnboardingForm, OnboardingGuard, SortMode, SteppingClock,
};
use matchly::error::AppError;
use std::sync::Arc;

const DEMO_UPLOAD_LIMIT: usize = 1024 * 1024;
const DEMO_START_MILLIS: i64 = 1_767_225_600_000;
const HOUR_MILLIS: i64 = 60 * 60 * 1000;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Niche filter applied to the brand view
    #[arg(long)]
    pub(crate) niche: Option<String>,
    /// Save this many of the seeded creators before browsing
    #[arg(long, default_value_t = 1)]
    pub(crate) save: usize,
}

struct Seed {
    name: &'static str,
    niche: &'static str,
    platform: &'static str,
    followers: &'static str,
}

const SEEDS: [Seed; 4] = [
    Seed {
        name: "Ava Reyes",
        niche: "Beauty",
        platform: "Instagram",
        followers: "5000",
    },
    Seed {
        name: "Marcus Lee",
        niche: "Fitness & Health",
        platform: "YouTube",
        followers: "50000",
    },
    Seed {
        name: "Priya Nair",
        niche: "Beauty & Skincare",
        platform: "TikTok",
        followers: "500000",
    },
    Seed {
        name: "Sam Ortiz",
        niche: "Gaming",
        platform: "Twitter/X",
        followers: "12000",
    },
];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { niche, save } = args;
    let service = CreatorDirectoryService::with_clock(
        Arc::new(MemoryStore::default()),
        Arc::new(MemoryBlobStore::default()),
        OnboardingGuard::new(DEMO_UPLOAD_LIMIT),
        Arc::new(SteppingClock::new(DEMO_START_MILLIS, HOUR_MILLIS)),
    );

    println!("Creator onboarding");
    let mut onboarded: Vec<CreatorId> = Vec::new();
    for seed in &SEEDS {
        let form = OnboardingForm {
            name: seed.name.to_string(),
            niche: seed.niche.to_string(),
            platform: seed.platform.to_string(),
            followers: seed.followers.to_string(),
        };
        let kit = Attachment::new(
            format!("{}.pdf", seed.name.to_lowercase().replace(' ', "-")),
            "application/pdf",
            format!("%PDF-1.7 media kit for {}", seed.name).into_bytes(),
        );
        let record = service.onboard(form, Some(kit))?;
        println!("- {} joined as {}", record.name, record.id);
        onboarded.push(record.id);
    }

    let rejected = OnboardingForm {
        name: "Jordan Blake".to_string(),
        niche: "Travel".to_string(),
        platform: "Instagram".to_string(),
        followers: "8000".to_string(),
    };
    let screenshot = Attachment::new("kit.png", "image/png", b"\x89PNG".to_vec());
    match service.onboard(rejected, Some(screenshot)) {
        Err(DirectoryServiceError::Validation(errors)) => {
            println!("- Jordan Blake was turned away: {}", errors.messages().join("; "));
        }
        Err(err) => return Err(err.into()),
        Ok(record) => println!("- {} joined unexpectedly", record.name),
    }

    if let Some(dashboard) = service.dashboard()? {
        println!();
        render_dashboard(&dashboard);
    }

    for id in onboarded.iter().take(save) {
        service.toggle_saved(id)?;
    }

    let query = DiscoveryQuery {
        niche,
        ..DiscoveryQuery::default()
    };
    let criteria = query.criteria();
    for sort in [
        SortMode::RecentlyAdded,
        SortMode::MostFollowers,
        SortMode::LeastFollowers,
    ] {
        println!();
        render_view(&service.discover(&criteria, sort)?);
    }

    Ok(())
}
