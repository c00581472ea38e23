//! tocspy - simulate TOC scroll tracking on an HTML page

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use tocspy::dom::{DEFAULT_TOC_TOP, StaticPage, Viewport};
use tocspy::{ClickOutcome, Controller, Host, SpyConfig, Update};

#[derive(Parser)]
#[command(name = "tocspy")]
#[command(version, about = "Simulate scroll-synchronized TOC highlighting", long_about = None)]
#[command(after_help = "EXAMPLES:
    tocspy page.html                       List tracked headings
    tocspy page.html --scroll 400 -s 1200  Report the active heading at each offset
    tocspy page.html --click usage         Resolve a TOC click on #usage")]
struct Cli {
    /// HTML page with a table of contents
    #[arg(value_name = "PAGE")]
    input: PathBuf,

    /// Scroll the window to this offset (repeatable, applied in order)
    #[arg(short, long = "scroll", value_name = "Y")]
    scroll: Vec<f64>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1440.0)]
    width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 900.0)]
    height: f64,

    /// Distance from the viewport top to the sticky TOC panel
    #[arg(long, value_name = "PX", default_value_t = DEFAULT_TOC_TOP)]
    toc_top: f64,

    /// Click the TOC link pointing at this heading id
    #[arg(short, long, value_name = "ID")]
    click: Option<String>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a JSON report
    #[arg(long)]
    json: bool,

    /// Log spy decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report {
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    headings: Vec<HeadingReport>,
    initial: Option<String>,
    steps: Vec<Step>,
    #[serde(skip_serializing_if = "Option::is_none")]
    click: Option<ClickReport>,
}

#[derive(Serialize)]
struct HeadingReport {
    id: String,
    offset: f64,
}

#[derive(Serialize)]
struct Step {
    requested: f64,
    scroll_y: f64,
    active: Option<String>,
    toc_scrolled: bool,
}

#[derive(Serialize)]
struct ClickReport {
    id: String,
    intercepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    scroll_to: Option<f64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "trace" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(report) => {
            if cli.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_report(&report);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> tocspy::Result<Report> {
    let config = match &cli.config {
        Some(path) => SpyConfig::load(path)?,
        None => SpyConfig::default(),
    };
    let viewport = Viewport::new(cli.width, cli.height);
    let page = StaticPage::from_file(&cli.input, viewport, &config.toc_selector)?
        .with_toc_top(cli.toc_top);

    let mut controller = match Controller::install(page, config) {
        Ok(controller) => controller,
        Err(reason) => {
            return Ok(Report {
                active: false,
                reason: Some(reason.to_string()),
                headings: Vec::new(),
                initial: None,
                steps: Vec::new(),
                click: None,
            });
        }
    };

    let headings = controller
        .spy()
        .headings()
        .iter()
        .map(|heading| HeadingReport {
            id: heading.id.clone(),
            offset: controller.host().offset_top(&heading.element),
        })
        .collect();
    let initial = active_href(&controller);

    let mut steps = Vec::new();
    for &requested in &cli.scroll {
        controller.host_mut().scroll_to(requested);
        let update = if controller.on_scroll() {
            controller.on_animation_frame()
        } else {
            Update::Unchanged
        };
        steps.push(Step {
            requested,
            scroll_y: controller.host().scroll_y(),
            active: active_href(&controller),
            toc_scrolled: matches!(update, Update::Activated { revealed: true, .. }),
        });
    }

    let click = cli.click.as_ref().map(|id| {
        let fragment = format!("#{id}");
        let link = controller
            .spy()
            .links()
            .iter()
            .position(|link| link.href.as_deref() == Some(fragment.as_str()));
        let outcome = link.map(|index| controller.on_click(index));
        match outcome {
            Some(ClickOutcome::Navigate { top, .. }) => ClickReport {
                id: id.clone(),
                intercepted: true,
                scroll_to: Some(top),
            },
            _ => ClickReport {
                id: id.clone(),
                intercepted: false,
                scroll_to: None,
            },
        }
    });

    Ok(Report {
        active: true,
        reason: None,
        headings,
        initial,
        steps,
        click,
    })
}

fn active_href(controller: &Controller<StaticPage>) -> Option<String> {
    controller
        .spy()
        .active_link()
        .and_then(|link| link.href.clone())
}

fn print_report(report: &Report) {
    if let Some(reason) = &report.reason {
        println!("Scroll spy inactive: {reason}");
        return;
    }

    println!("Tracking {} headings:", report.headings.len());
    for heading in &report.headings {
        println!("  #{:<30} {:>8.0}px", heading.id, heading.offset);
    }
    println!(
        "Initially active: {}",
        report.initial.as_deref().unwrap_or("(none)")
    );

    for step in &report.steps {
        let toc = if step.toc_scrolled { " [toc scrolled]" } else { "" };
        println!(
            "scroll {} (at {}): {}{toc}",
            step.requested,
            step.scroll_y,
            step.active.as_deref().unwrap_or("(none)")
        );
    }

    if let Some(click) = &report.click {
        match click.scroll_to {
            Some(top) if click.intercepted => println!("click #{}: scroll to {top}", click.id),
            _ => println!("click #{}: default navigation", click.id),
        }
    }
}
