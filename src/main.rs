// SPDX-License-Identifier: MIT

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde_json::Value;
use std::sync::Arc;

use flowgraph_rs::engine::{BoxError, EngineConfig, ExecutionMode, Node};
use flowgraph_rs::flow::nodes::TransformNode;
use flowgraph_rs::flow::{GraphBuilder, NodeRegistry};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a graph definition and print the result as JSON
    Run {
        /// Path to the graph YAML file
        #[arg(short, long)]
        file: String,

        /// JSON payload handed to every entry node
        #[arg(short, long, default_value = "null")]
        input: String,

        /// Override the definition's execution mode (sequential or concurrent)
        #[arg(short, long)]
        mode: Option<ExecutionMode>,
    },
    /// Show the nodes, entry nodes and edges of a graph definition
    Inspect {
        /// Path to the graph YAML file
        #[arg(short, long)]
        file: String,
    },
}

/// Factories available to `registered` nodes
async fn register_factories(registry: &NodeRegistry) {
    registry
        .register(
            "uppercase",
            |id: &str, _: &Value| -> Result<Arc<dyn Node>, BoxError> {
                Ok(Arc::new(TransformNode::new(id, |value| match value {
                    Value::String(s) => Ok(Value::String(s.to_uppercase())),
                    other => Err(format!("expected a string, got {}", other).into()),
                })))
            },
        )
        .await;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let registry = NodeRegistry::new();
    register_factories(&registry).await;
    let builder = GraphBuilder::new(registry);

    match args.command {
        Commands::Run { file, input, mode } => {
            let payload: Value = serde_json::from_str(&input)
                .with_context(|| format!("Input is not valid JSON: {}", input))?;

            let mut graph = builder
                .build_file(&file)
                .await
                .with_context(|| format!("Failed to build graph from {}", file))?;
            if let Some(mode) = mode {
                graph = graph.with_config(EngineConfig { mode });
            }

            log::info!("Running graph '{}' in {:?} mode", graph.name(), graph.config().mode);
            let result = graph.execute(payload).await;
            println!("{}", serde_json::to_string_pretty(&result.to_json())?);

            if !result.succeeded {
                std::process::exit(1);
            }
        }
        Commands::Inspect { file } => {
            let graph = builder
                .build_file(&file)
                .await
                .with_context(|| format!("Failed to build graph from {}", file))?;

            println!("Graph: {} ({:?})", graph.name(), graph.config().mode);
            println!("Nodes: {}", graph.node_ids().join(", "));
            println!("Entry nodes: {}", graph.entry_nodes().join(", "));
            println!("Terminal nodes: {}", graph.terminal_nodes().join(", "));
            println!("Edges:");
            for edge in graph.edges() {
                let mut notes = Vec::new();
                if edge.has_transform() {
                    notes.push("transform");
                }
                if edge.has_condition() {
                    notes.push("condition");
                }
                if notes.is_empty() {
                    println!("  {} -> {}", edge.from, edge.to);
                } else {
                    println!("  {} -> {} [{}]", edge.from, edge.to, notes.join(", "));
                }
            }
        }
    }

    Ok(())
}
