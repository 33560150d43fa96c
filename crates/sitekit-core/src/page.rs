//! The page: every component wired to one document and one clock
//!
//! A [`Page`] is built by a single [`Page::init`] pass. After that, input
//! arrives through [`Page::dispatch`] and time moves forward through
//! [`Page::advance`]; both run synchronously on the caller's task.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::animation::{CounterAnimator, ObserverOptions, SmoothScroller, VisibilityAnimator};
use crate::components::{
    ContactForm, CookieNotice, HeaderState, IndicatorRefresher, Media, Navigation, Newsletter,
    ProductFilter, ProductGallery, ResponsiveMenu, Search, SeeMore, ServiceCards,
};
use crate::config::AppConfig;
use crate::debounce::Debounce;
use crate::dom::{Document, NodeId};
use crate::notify::Notifier;
use crate::storage::KeyValueStore;
use crate::timers::{TimerQueue, TimerTask};
use crate::Result;

/// Input delivered to a page
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The visitor scrolled to `y`
    Scroll { y: f64 },
    Resize { width: f64, height: f64 },
    Click { target: NodeId },
    KeyPress { target: NodeId, key: String },
    /// A form field's value changed
    Input { target: NodeId, value: String },
    Submit { form: NodeId },
    /// Global "accept cookies" action, as wired to an inline handler
    AcceptCookies,
}

/// Which features found their elements during init
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Features {
    pub reveal_targets: usize,
    pub counters: usize,
    pub nav_links: usize,
    pub responsive_menu: bool,
    pub cookie_notice: bool,
    pub cookies_accepted: bool,
    pub indicator_refresh: bool,
    pub header_state: bool,
    pub search: bool,
    pub media: bool,
    pub service_cards: bool,
    pub see_more: bool,
    pub product_filter: bool,
    pub product_gallery: bool,
    pub contact_form: bool,
    pub newsletter: bool,
}

pub struct Page {
    doc: Document,
    notifier: Arc<dyn Notifier>,
    timers: TimerQueue,
    scroll_spy: Debounce<f64>,
    scroller: SmoothScroller,
    counters: CounterAnimator,
    visibility: VisibilityAnimator,
    navigation: Option<Navigation>,
    menu: Option<ResponsiveMenu>,
    cookie: Option<CookieNotice>,
    refresher: Option<IndicatorRefresher>,
    header: Option<HeaderState>,
    search: Option<Search>,
    media: Option<Media>,
    services: Option<ServiceCards>,
    see_more: Option<SeeMore>,
    filter: Option<ProductFilter>,
    gallery: Option<ProductGallery>,
    contact: Option<ContactForm>,
    newsletter: Option<Newsletter>,
    features: Features,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("features", &self.features)
            .field("timers", &self.timers.len())
            .field("scroll_y", &self.doc.viewport().scroll_y)
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Build every component against `doc`.
    ///
    /// Features whose elements are missing are skipped. A selector that
    /// cannot be parsed, or an invalid base URL, is an error.
    pub fn init(
        mut doc: Document,
        config: &AppConfig,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        now: Instant,
    ) -> Result<Self> {
        let base = Url::parse(&config.site.base_url)?;
        let selectors = config.selectors();

        let mut visibility = VisibilityAnimator::new(
            ObserverOptions::from(&config.animation),
            selectors.reveal_class.clone(),
        );
        let targets = doc.query_selector_all(&selectors.reveal_targets)?;
        visibility.observe(&mut doc, &targets);

        let mut counters = CounterAnimator::new();
        let displays = doc.query_selector_all(&selectors.metric_displays)?;
        let counter_count = counters.animate_matching(
            &doc,
            &displays,
            &config.animation.currency_symbol,
            Duration::from_millis(config.animation.counter_duration_ms),
            now,
        );

        let navigation = Navigation::init(&doc, &selectors, &base)?;
        let menu = ResponsiveMenu::init(&mut doc, &selectors, config.menu.breakpoint_px)?;
        let cookie = CookieNotice::init(&mut doc, &selectors.cookie_notice, &config.cookie, store)?;

        let mut timers = TimerQueue::new();
        let refresher = IndicatorRefresher::init(&doc, &selectors.indicators, &config.refresh)?;
        if let Some(refresher) = &refresher {
            refresher.start(&mut timers, now);
        }

        let header = HeaderState::init(
            &doc,
            selectors.header.as_deref(),
            config.scroll.header_scrolled_threshold_px,
        )?;

        let features = Features {
            reveal_targets: targets.len(),
            counters: counter_count,
            nav_links: navigation.as_ref().map(|n| n.links().len()).unwrap_or(0),
            responsive_menu: menu.is_some(),
            cookie_notice: cookie.is_some(),
            cookies_accepted: cookie.as_ref().is_some_and(|c| c.has_accepted()),
            indicator_refresh: refresher.is_some(),
            header_state: header.is_some(),
            ..Default::default()
        };

        let mut page = Self {
            notifier,
            timers,
            scroll_spy: Debounce::new(Duration::from_millis(config.scroll.debounce_ms)),
            scroller: SmoothScroller::from_config(&config.navigation),
            counters,
            visibility,
            navigation,
            menu,
            cookie,
            refresher,
            header,
            search: Search::init(&doc, &selectors)?,
            media: Media::init(&doc, &selectors)?,
            services: ServiceCards::init(&doc, &selectors)?,
            see_more: SeeMore::init(&doc, &selectors)?,
            filter: ProductFilter::init(&doc, &selectors)?,
            gallery: ProductGallery::init(&doc, &selectors)?,
            contact: ContactForm::init(&doc, &selectors)?,
            newsletter: Newsletter::init(&doc, &selectors)?,
            features,
            doc,
        };
        page.features.search = page.search.is_some();
        page.features.media = page.media.is_some();
        page.features.service_cards = page.services.is_some();
        page.features.see_more = page.see_more.is_some();
        page.features.product_filter = page.filter.is_some();
        page.features.product_gallery = page.gallery.is_some();
        page.features.contact_form = page.contact.is_some();
        page.features.newsletter = page.newsletter.is_some();

        info!(
            profile = ?config.site.profile,
            reveal_targets = page.features.reveal_targets,
            counters = page.features.counters,
            nav_links = page.features.nav_links,
            "Page initialized"
        );
        Ok(page)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn navigation(&self) -> Option<&Navigation> {
        self.navigation.as_ref()
    }

    pub fn menu(&self) -> Option<&ResponsiveMenu> {
        self.menu.as_ref()
    }

    pub fn cookie_notice(&self) -> Option<&CookieNotice> {
        self.cookie.as_ref()
    }

    pub fn refresher(&self) -> Option<&IndicatorRefresher> {
        self.refresher.as_ref()
    }

    pub fn visibility(&self) -> &VisibilityAnimator {
        &self.visibility
    }

    pub fn counters(&self) -> &CounterAnimator {
        &self.counters
    }

    pub fn scroll_y(&self) -> f64 {
        self.doc.viewport().scroll_y
    }

    /// Whether something animates and wants per-frame `advance` calls
    pub fn needs_frames(&self) -> bool {
        self.scroller.is_animating() || self.counters.is_animating()
    }

    /// Earliest instant at which `advance` has deferred work to run
    pub fn next_wakeup(&self) -> Option<Instant> {
        match (self.timers.next_deadline(), self.scroll_spy.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Handle one input event
    pub fn dispatch(&mut self, event: PageEvent, now: Instant) {
        match event {
            PageEvent::Scroll { y } => {
                // User scrolling interrupts a running smooth scroll.
                self.scroller.cancel();
                self.scroll_changed(y, now);
            }
            PageEvent::Resize { width, height } => self.resize(width, height),
            PageEvent::Click { target } => self.click(target, now),
            PageEvent::KeyPress { target, key } => {
                if let Some(search) = &self.search {
                    search.handle_key(&mut self.doc, target, &key, self.notifier.as_ref());
                }
            }
            PageEvent::Input { target, value } => self.doc.set_value(target, &value),
            PageEvent::Submit { form } => self.submit(form),
            PageEvent::AcceptCookies => {
                self.accept_cookies(now);
            }
        }
    }

    /// Run everything due at `now`: timers in deadline order, a smooth
    /// scroll frame, the debounced scroll-spy and counter frames.
    pub fn advance(&mut self, now: Instant) {
        while let Some((deadline, task)) = self.timers.pop_due(now) {
            self.run_task(task, deadline);
        }

        if let Some(y) = self.scroller.update(now) {
            self.scroll_changed(y, now);
        }

        if let Some(y) = self.scroll_spy.poll(now) {
            if let Some(navigation) = &mut self.navigation {
                navigation.on_scroll(&mut self.doc, y);
            }
        }

        self.counters.update(&mut self.doc, now);
    }

    /// Accept cookies. Returns false when the page has no cookie notice.
    pub fn accept_cookies(&mut self, now: Instant) -> bool {
        let Some(cookie) = &self.cookie else {
            return false;
        };
        cookie.accept(&mut self.doc, &mut self.timers, now);
        self.features.cookies_accepted = true;
        true
    }

    /// Cancel all pending work, remove generated controls and hand the
    /// document back for a fresh `init`
    pub fn teardown(mut self) -> Document {
        self.timers.clear();
        self.scroll_spy.cancel();
        self.scroller.cancel();
        self.counters.finish_all(&mut self.doc);
        if let Some(menu) = &mut self.menu {
            menu.teardown(&mut self.doc);
        }
        debug!("Page torn down");
        self.doc
    }

    fn run_task(&mut self, task: TimerTask, deadline: Instant) {
        match task {
            TimerTask::CookieFadeComplete => {
                if let Some(cookie) = &self.cookie {
                    cookie.complete_fade(&mut self.doc);
                }
            }
            TimerTask::IndicatorRefresh => {
                if let Some(refresher) = &mut self.refresher {
                    refresher.on_cycle(&mut self.doc, &mut self.timers, deadline);
                }
            }
            TimerTask::FlashReset { node } => {
                if let Some(refresher) = &self.refresher {
                    refresher.reset_flash(&mut self.doc, node);
                }
            }
        }
    }

    /// Apply a new scroll offset, whether from the visitor or a frame
    fn scroll_changed(&mut self, y: f64, now: Instant) {
        self.doc.viewport_mut().scroll_y = y;

        if let Some(header) = &self.header {
            header.on_scroll(&mut self.doc, y);
        }
        self.visibility.check(&mut self.doc);

        if self.scroll_spy.wait().is_zero() {
            if let Some(navigation) = &mut self.navigation {
                navigation.on_scroll(&mut self.doc, y);
            }
        } else {
            self.scroll_spy.call(y, now);
        }
    }

    fn start_scroll(&mut self, target: f64, now: Instant) {
        let from = self.doc.viewport().scroll_y;
        let max = self.doc.max_scroll();
        if let Some(y) = self.scroller.scroll_to(from, target, max, now) {
            self.scroll_changed(y, now);
        }
    }

    fn resize(&mut self, width: f64, height: f64) {
        let viewport = self.doc.viewport_mut();
        viewport.width = width;
        viewport.height = height;

        if let Some(menu) = &mut self.menu {
            if let Err(e) = menu.on_resize(&mut self.doc, width) {
                warn!(error = %e, "Failed to update responsive menu");
            }
        }
        self.visibility.check(&mut self.doc);
    }

    /// Route a click to the first component that owns the target
    fn click(&mut self, target: NodeId, now: Instant) {
        let notifier = Arc::clone(&self.notifier);
        let notifier = notifier.as_ref();

        if self
            .cookie
            .as_ref()
            .is_some_and(|c| c.is_accept_control(&self.doc, target))
        {
            self.accept_cookies(now);
            return;
        }

        if let Some(menu) = &mut self.menu {
            if menu.is_toggle(&self.doc, target) {
                let state = menu.toggle(&mut self.doc);
                debug!(?state, "Menu toggled");
                return;
            }
        }

        if let Some(gallery) = &self.gallery {
            if gallery.handle_add_to_cart(&self.doc, target, notifier) {
                return;
            }
        }

        if let Some(navigation) = &mut self.navigation {
            if let Some(index) = navigation.link_for(&self.doc, target) {
                if let Some(offset) = navigation.click(&mut self.doc, index) {
                    if let Some(menu) = &mut self.menu {
                        menu.collapse(&mut self.doc);
                    }
                    self.start_scroll(offset, now);
                }
                return;
            }
            if let Some(offset) = navigation.anchor_target(&self.doc, target) {
                self.start_scroll(offset, now);
                return;
            }
        }

        if let Some(media) = &self.media {
            if media.handle_click(&self.doc, target, notifier) {
                return;
            }
        }

        if let Some(search) = &self.search {
            if search.handle_click(&mut self.doc, target, notifier) {
                return;
            }
        }

        if let Some(filter) = &self.filter {
            if filter.handle_click(&mut self.doc, target) {
                return;
            }
        }

        if let Some(gallery) = &self.gallery {
            if gallery.handle_select(&self.doc, target, notifier) {
                return;
            }
        }

        if let Some(services) = &self.services {
            if services.handle_click(&self.doc, target, notifier) {
                return;
            }
        }

        if let Some(see_more) = &self.see_more {
            see_more.handle_click(&self.doc, target, notifier);
        }
    }

    fn submit(&mut self, form: NodeId) {
        let notifier = self.notifier.as_ref();
        if let Some(contact) = &self.contact {
            if contact.form() == form {
                contact.submit(&mut self.doc, notifier);
                return;
            }
        }
        if let Some(newsletter) = &self.newsletter {
            if newsletter.form() == form {
                newsletter.submit(&mut self.doc, notifier);
                return;
            }
        }
        debug!(form = form.index(), "Submit for an unmanaged form");
    }
}
