use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::time::Instant;

use sitekit_core::notify::LogNotifier;
use sitekit_core::{AppConfig, Page};

use super::{load_fixture, open_store};

pub fn run(config: &AppConfig, path: &Path, json: bool) -> Result<()> {
    let (config, _, doc) = load_fixture(config, path)?;
    let page = Page::init(
        doc,
        &config,
        open_store(&config),
        Arc::new(LogNotifier),
        Instant::now(),
    )?;
    let features = page.features();

    if json {
        println!("{}", serde_json::to_string_pretty(features)?);
        return Ok(());
    }

    let flag = |on: bool| if on { "yes" } else { "no" };

    println!("Profile: {:?}", config.site.profile);
    println!("Base URL: {}\n", config.site.base_url);
    println!(
        "  Reveal targets:    {} (class {})",
        features.reveal_targets,
        page.visibility().reveal_class()
    );
    println!("  Counters:          {}", features.counters);
    println!("  Navigation links:  {}", features.nav_links);
    println!("  Responsive menu:   {}", flag(features.responsive_menu));
    println!(
        "  Cookie notice:     {}{}",
        flag(features.cookie_notice),
        if features.cookies_accepted { " (accepted)" } else { "" }
    );
    match page.refresher() {
        Some(refresher) => println!(
            "  Indicator refresh: yes (every {}s)",
            refresher.interval().as_secs()
        ),
        None => println!("  Indicator refresh: no"),
    }
    println!("  Header state:      {}", flag(features.header_state));
    println!("  Search:            {}", flag(features.search));
    println!("  Video cards:       {}", flag(features.media));
    println!("  Service cards:     {}", flag(features.service_cards));
    println!("  See-more links:    {}", flag(features.see_more));
    println!("  Product filter:    {}", flag(features.product_filter));
    println!("  Product gallery:   {}", flag(features.product_gallery));
    println!("  Contact form:      {}", flag(features.contact_form));
    println!("  Newsletter:        {}", flag(features.newsletter));

    if let Some(navigation) = page.navigation() {
        println!("\nNavigation:");
        for link in navigation.links() {
            let target = link.section().unwrap_or("(external)");
            println!("  {} -> {}", link.label(), target);
        }
    }

    Ok(())
}
