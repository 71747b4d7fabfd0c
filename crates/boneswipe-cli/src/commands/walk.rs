//! Walk command
//!
//! Usage: boneswipe walk <SCENE> [--root <ID>] [--forward <EXPR>]... [--backward <EXPR>]...
//!        [--action <ACTION>] [--config <FILE>] [--log <FORMAT>] [--json]

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use boneswipe_core::errors::SwError;
use boneswipe_core::logging_facility::{init, Profile};
use boneswipe_core::rules::{action_fn, NormalizeOrientation, SpawnMarker};
use boneswipe_core::scene::Marker;
use boneswipe_core::{
    ExpressionError, Pass, Rule, RuleSet, TreeWalker, WalkConfig, WalkError, WalkOutcome,
    WalkReport,
};
use clap::{Args, ValueEnum};
use serde::Serialize;

#[derive(Debug, Args)]
pub struct WalkArgs {
    /// Path to scene YAML file
    pub scene: PathBuf,

    /// Root node id (default: the scene's first selected node)
    #[arg(short, long)]
    pub root: Option<String>,

    /// Predicate for a forward-pass rule; repeat for more rules
    #[arg(short, long = "forward", value_name = "EXPR")]
    pub forward: Vec<String>,

    /// Predicate for a backward-pass rule; repeat for more rules
    #[arg(short, long = "backward", value_name = "EXPR")]
    pub backward: Vec<String>,

    /// What every rule does when its predicate holds
    #[arg(short, long, value_enum, default_value_t = ActionKind::Print)]
    pub action: ActionKind,

    /// Walk configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit structured logs to stderr
    #[arg(long, value_enum)]
    pub log: Option<LogFormat>,

    /// Print the walk report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionKind {
    SpawnMarker,
    Normalize,
    Print,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Dev,
    Json,
}

/// A node reported by the print action
#[derive(Debug, Clone, Serialize)]
struct Hit {
    pass: Pass,
    node_id: String,
    depth: usize,
}

#[derive(Debug, Serialize)]
struct WalkOutput<'a> {
    scene_digest: &'a str,
    report: &'a WalkReport,
    hits: &'a [Hit],
    markers: &'a [Marker],
}

/// Execute walk command
pub fn execute(args: WalkArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.log {
        Some(LogFormat::Dev) => init(Profile::Development),
        Some(LogFormat::Json) => init(Profile::Production),
        None => {}
    }

    let config = match &args.config {
        Some(path) => WalkConfig::load(path).map_err(SwError::from)?,
        None => WalkConfig::default(),
    };

    let scene = boneswipe_store::import_scene(&args.scene)?;

    let hits: Rc<RefCell<Vec<Hit>>> = Rc::new(RefCell::new(Vec::new()));
    let rules = build_rules(&args, &hits).map_err(SwError::from)?;

    let walker = TreeWalker::new(config)
        .map_err(SwError::from)?
        .on_no_root(|_: &WalkError| {
            eprintln!("No root node selected; nothing to walk");
        });

    let graph = &scene.graph;
    let report = match &args.root {
        Some(root) => walker.walk(root, &rules, graph, graph),
        None => walker.walk_selection(graph, &rules, graph, graph),
    }
    .map_err(SwError::from)?;

    let hits = hits.borrow();
    let markers = graph.markers();

    if args.json {
        let output = WalkOutput {
            scene_digest: &scene.digest,
            report: &report,
            hits: &hits,
            markers: &markers,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for hit in hits.iter() {
        println!("{}\t{}\t{}", hit.pass, hit.depth, hit.node_id);
    }
    for marker in &markers {
        println!(
            "✓ {} at ({}, {}, {})",
            marker.id, marker.translate.x, marker.translate.y, marker.translate.z
        );
    }
    for failure in &report.failures {
        eprintln!(
            "warning: rule {} ({} pass) at {}: {}",
            failure.rule_index, failure.pass, failure.node_id, failure.message
        );
    }
    match report.outcome {
        WalkOutcome::Completed => println!(
            "Visited {} nodes, {} rules fired",
            report.nodes_visited, report.rules_fired
        ),
        WalkOutcome::NoRoot => {}
        WalkOutcome::Cancelled => println!("Walk cancelled after {} nodes", report.nodes_visited),
    }

    Ok(())
}

/// Compile every predicate up front; one bad expression rejects the whole run
fn build_rules(args: &WalkArgs, hits: &Rc<RefCell<Vec<Hit>>>) -> Result<RuleSet, ExpressionError> {
    let mut rules = RuleSet::new();
    for text in &args.forward {
        rules = rules.with_forward(build_rule(text, args.action, hits)?);
    }
    for text in &args.backward {
        rules = rules.with_backward(build_rule(text, args.action, hits)?);
    }
    Ok(rules)
}

fn build_rule(
    text: &str,
    action: ActionKind,
    hits: &Rc<RefCell<Vec<Hit>>>,
) -> Result<Rule, ExpressionError> {
    match action {
        ActionKind::SpawnMarker => Rule::when(text, SpawnMarker),
        ActionKind::Normalize => Rule::when(text, NormalizeOrientation),
        ActionKind::Print => {
            let hits = Rc::clone(hits);
            Rule::when(
                text,
                action_fn(move |ctx, _| {
                    hits.borrow_mut().push(Hit {
                        pass: ctx.pass(),
                        node_id: ctx.current().id.clone(),
                        depth: ctx.current().depth,
                    });
                    Ok(())
                }),
            )
        }
    }
}
