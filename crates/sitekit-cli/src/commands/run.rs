use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::warn;

use sitekit_core::components::MenuState;
use sitekit_core::notify::{ChannelNotifier, RecordingNotifier};
use sitekit_core::{AppConfig, Page, PageRuntime};

use super::{load_fixture, open_store};

fn elapsed_ms(start: Instant, now: Instant) -> u128 {
    now.saturating_duration_since(start).as_millis()
}

fn report(notifier: &RecordingNotifier, start: Instant, now: Instant) {
    for notification in notifier.take() {
        println!("[{:>6}ms] {}", elapsed_ms(start, now), notification);
    }
}

/// Step the page forward to `until`, one frame at a time while something
/// animates and straight to the next deadline otherwise
fn advance_to(
    page: &mut Page,
    now: &mut Instant,
    until: Instant,
    frame: Duration,
    notifier: &RecordingNotifier,
    start: Instant,
) {
    while *now < until {
        let candidate = if page.needs_frames() {
            *now + frame
        } else {
            page.next_wakeup().unwrap_or(until)
        };
        *now = candidate.max(*now + Duration::from_millis(1)).min(until);
        page.advance(*now);
        report(notifier, start, *now);
    }
}

/// Replay the fixture timeline on a virtual clock
pub fn run(config: &AppConfig, path: &Path, settle_ms: u64) -> Result<()> {
    let (config, fixture, doc) = load_fixture(config, path)?;
    let notifier = RecordingNotifier::new();
    let start = Instant::now();
    let mut page = Page::init(
        doc,
        &config,
        open_store(&config),
        Arc::new(notifier.clone()),
        start,
    )?;
    let frame = Duration::from_secs_f64(1.0 / f64::from(config.animation.animation_fps.max(1)));

    println!("Replaying {} ({} events)\n", path.display(), fixture.timeline.len());

    let mut now = start;
    for entry in &fixture.timeline {
        let at = start + Duration::from_millis(entry.at_ms);
        advance_to(&mut page, &mut now, at, frame, &notifier, start);

        match entry.event.resolve(page.document()) {
            Ok(event) => {
                page.dispatch(event, now);
                page.advance(now);
            }
            Err(e) => warn!(at_ms = entry.at_ms, error = %e, "Skipping timeline event"),
        }
        report(&notifier, start, now);
    }

    let end = now + Duration::from_millis(settle_ms);
    advance_to(&mut page, &mut now, end, frame, &notifier, start);

    print_summary(&page, elapsed_ms(start, now));
    Ok(())
}

/// Replay the fixture in wall-clock time through [`PageRuntime`]
pub async fn realtime(config: &AppConfig, path: &Path, settle_ms: u64) -> Result<()> {
    let (config, fixture, doc) = load_fixture(config, path)?;
    let (notifier, mut notifications) = ChannelNotifier::channel();
    let start = Instant::now();
    let page = Page::init(doc, &config, open_store(&config), Arc::new(notifier), start)?;

    let (runtime, handle) = PageRuntime::new(page, config.animation.animation_fps);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runtime_task = tokio::spawn(runtime.run(shutdown_rx));
    let printer = tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            println!("[{:>6}ms] {}", elapsed_ms(start, Instant::now()), notification);
        }
    });

    println!("Replaying {} in real time ({} events)\n", path.display(), fixture.timeline.len());

    for entry in &fixture.timeline {
        tokio::time::sleep_until(start + Duration::from_millis(entry.at_ms)).await;
        handle.send_scripted(entry.event.clone());
    }
    tokio::time::sleep(Duration::from_millis(settle_ms)).await;

    let _ = shutdown_tx.send(true);
    let page = runtime_task.await?;
    print_summary(&page, elapsed_ms(start, Instant::now()));

    // The notifier lives in the page; dropping it ends the printer.
    drop(page);
    printer.await?;
    Ok(())
}

fn print_summary(page: &Page, elapsed_ms: u128) {
    let doc = page.document();
    println!("\nAfter {}ms:", elapsed_ms);
    println!("  Scroll offset:   {:.0}px", page.scroll_y());

    if let Some(navigation) = page.navigation() {
        let active = navigation
            .active_link()
            .map(|l| l.label().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        println!("  Active link:     {}", active);
    }

    if let Some(menu) = page.menu() {
        let state = match menu.state() {
            MenuState::Collapsed => "collapsed",
            MenuState::Expanded => "expanded",
        };
        let toggle = if menu.toggle_control().is_some() {
            "toggle shown"
        } else {
            "inline"
        };
        println!("  Menu:            {} ({})", state, toggle);
    }

    let visibility = page.visibility();
    println!(
        "  Revealed:        {}/{}",
        visibility.observed() - visibility.pending(),
        visibility.observed()
    );

    if let Some(cookie) = page.cookie_notice() {
        let hidden = doc.style(cookie.notice(), "display") == Some("none");
        println!(
            "  Cookie notice:   {}",
            if hidden { "hidden" } else { "visible" }
        );
    }

    if let Some(refresher) = page.refresher() {
        match refresher.last_refreshed() {
            Some(at) => println!(
                "  Refresh cycles:  {} (last at {})",
                refresher.cycles(),
                at.with_timezone(&chrono::Local).format("%H:%M:%S")
            ),
            None => println!("  Refresh cycles:  0"),
        }
    }
}
