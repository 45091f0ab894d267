use anyhow::{Context, Result, bail};
use bus::{Bus, CoreEvent};
use clap::Parser;
use html::ParsedDocument;
use html::dom_utils::outline_from_dom;
use mimalloc::MiMalloc;
use navigation::{
    ClickDisposition, ClickModifiers, HeadlessPlatform, NavOutcome, NavTrigger, NavigationEngine,
    Page, Platform,
};
use net::FetchOptions;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

mod config;
mod widgets;

use config::Config;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "softnav", version)]
#[command(about = "Drive soft navigations against a live site from the command line")]
struct Cli {
    /// Config file (defaults to ./softnav.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print an outline of the final DOM
    #[arg(long)]
    dump: bool,

    /// Never animate the swap
    #[arg(long)]
    no_animate: bool,

    /// Page to load first
    start_url: String,

    /// Link hrefs to click, or `back`, `forward`, `toggle-theme`
    steps: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.no_animate {
        config.engine.animate_transitions = false;
    }
    init_logging(&config.log_level);

    let opts = config.net.fetch_options();
    let page = load_page(&cli.start_url, &opts)?;

    let Bus {
        cmd_tx,
        cmd_rx,
        evt_tx,
        evt_rx,
    } = Bus::new();
    let _net = runtime_net::start_net_runtime(cmd_rx, evt_tx.clone(), opts.clone());

    let platform = HeadlessPlatform::new(page.url.clone()).with_event_sender(evt_tx);
    let mut engine = NavigationEngine::new(config.engine.clone(), page, platform)
        .context("invalid engine configuration")?;
    engine.set_bus_sender(cmd_tx);
    widgets::register_all(&mut engine);
    engine.reinit_widgets();
    print_state("load", None, &engine);

    // Generous upper bound; the runtime enforces the real fetch timeout.
    let wait = opts.timeout + Duration::from_secs(5);
    for step in &cli.steps {
        let outcome = run_step(&mut engine, step);
        let outcome = match outcome {
            Some(NavOutcome::Pending(_)) => pump(&mut engine, &evt_rx, wait)?,
            other => other,
        };
        if outcome == Some(NavOutcome::HardNavigation)
            && let Err(err) = hard_load(&mut engine, &opts)
        {
            log::warn!("full page load failed: {err:#}");
        }
        print_state(step, outcome, &engine);
    }

    if cli.dump {
        for line in outline_from_dom(&engine.page().dom, 500) {
            println!("{line}");
        }
    }
    Ok(())
}

fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn load_page(url: &str, opts: &FetchOptions) -> Result<Page> {
    let res = net::fetch_blocking(url, opts);
    if let Some(err) = res.error {
        bail!("loading {url} failed: {err}");
    }
    Ok(Page::from_document(ParsedDocument::parse(res.url, &res.body)))
}

fn run_step(engine: &mut NavigationEngine<HeadlessPlatform>, step: &str) -> Option<NavOutcome> {
    match step {
        "back" => {
            let url = engine.platform_mut().back()?;
            Some(engine.handle_popstate(&url))
        }
        "forward" => {
            let url = engine.platform_mut().forward()?;
            Some(engine.handle_popstate(&url))
        }
        "toggle-theme" => {
            let key = engine.config().theme_key.clone();
            match widgets::toggle_theme(engine.page_mut(), &key) {
                Ok(theme) => log::info!("theme is now {theme}"),
                Err(err) => log::warn!("theme toggle failed: {err}"),
            }
            None
        }
        href => click_href(engine, href),
    }
}

/// Click the first anchor whose `href` is `href`; navigate directly if the
/// page has no such link.
fn click_href(engine: &mut NavigationEngine<HeadlessPlatform>, href: &str) -> Option<NavOutcome> {
    let anchor = html::Selector::parse("a")
        .ok()?
        .select_all(&engine.page().dom)
        .into_iter()
        .find(|a| a.attr("href") == Some(href))
        .map(|a| a.id());

    let Some(anchor) = anchor else {
        log::warn!("no link to {href} on {}; navigating directly", engine.page().url);
        return Some(engine.navigate(href, NavTrigger::Click));
    };
    match engine.click(anchor, ClickModifiers::default()) {
        (ClickDisposition::Default, _) => {
            log::info!("link to {href} not intercepted; the browser would follow it");
            None
        }
        (ClickDisposition::PreventDefault, outcome) => outcome,
    }
}

/// Feed runtime and platform events to the engine until the run settles.
fn pump(
    engine: &mut NavigationEngine<HeadlessPlatform>,
    evt_rx: &Receiver<CoreEvent>,
    wait: Duration,
) -> Result<Option<NavOutcome>> {
    let mut last = None;
    while engine.is_navigating() {
        match evt_rx.recv_timeout(wait) {
            Ok(evt) => {
                if let Some(outcome) = engine.on_core_event(evt) {
                    last = Some(outcome);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("no response within {wait:?}; cancelling");
                engine.cancel();
            }
            Err(RecvTimeoutError::Disconnected) => bail!("network runtime stopped"),
        }
    }
    Ok(last)
}

/// The browser's full page load after a failed soft navigation. Session
/// storage survives; everything else is rebuilt.
fn hard_load(engine: &mut NavigationEngine<HeadlessPlatform>, opts: &FetchOptions) -> Result<()> {
    let Some(url) = engine.platform().locations.last().cloned() else {
        return Ok(());
    };
    let mut page = load_page(&url, opts)?;
    page.session = std::mem::take(&mut engine.page_mut().session);
    *engine.page_mut() = page;
    if engine.platform().current_entry() != Some(url.as_str()) {
        engine.platform_mut().push_history(&url);
    }
    engine.reinit_widgets();
    Ok(())
}

fn print_state(step: &str, outcome: Option<NavOutcome>, engine: &NavigationEngine<HeadlessPlatform>) {
    let page = engine.page();
    let outcome = outcome.map_or_else(|| "-".to_string(), |o| format!("{o:?}"));
    println!(
        "{step:>14}  {outcome:<24} {}  \"{}\"  [{}]",
        page.url,
        page.title().unwrap_or_default(),
        page.body_classes().join(" ")
    );
}
