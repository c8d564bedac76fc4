// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use dagwood_bridge::bridge::{then, CompletionCallback};
use dagwood_bridge::config::{load_and_validate_context, ComponentContext};
use dagwood_bridge::facade::InstanceFacade;
use dagwood_bridge::traits::MessageHandler;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const DEFAULT_MIN_LENGTH: u64 = 3;

/// Accepts words at least `min_length` characters long and fails the rest
struct WordFilter {
    min_length: usize,
    accepted: AtomicUsize,
}

#[async_trait]
impl MessageHandler for WordFilter {
    async fn handle(&self, payload: Value) -> anyhow::Result<()> {
        let word = payload
            .get("word")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("payload carries no word"))?;

        if word.chars().count() < self.min_length {
            bail!("'{}' is shorter than {} characters", word, self.min_length);
        }
        self.accepted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "word_filter"
    }
}

fn default_context() -> ComponentContext {
    ComponentContext::new("word_counter").with_input("words")
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} [context.yaml] <input_text>", args[0]);
        eprintln!("Example: {} configs/word-counter.yaml \"a quick brown fox\"", args[0]);
        std::process::exit(1);
    }

    // The last argument is the input text, an optional context file precedes it
    let input_text = &args[args.len() - 1];
    let context_file = if args.len() >= 3 { Some(args[1].as_str()) } else { None };

    if let Err(e) = run(context_file, input_text).await {
        eprintln!("❌ Demo failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(context_file: Option<&str>, input_text: &str) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let context = match context_file {
        Some(path) => load_and_validate_context(path)?,
        None => default_context(),
    };
    let input_port = context
        .inputs
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("component '{}' declares no input port", context.id))?;
    let min_length = context
        .config_value("min_length")
        .and_then(serde_yaml::Value::as_u64)
        .unwrap_or(DEFAULT_MIN_LENGTH) as usize;

    println!("🔌 DAGwood Bridge Demo");
    println!("═══════════════════════");
    println!("Input: \"{}\"", input_text);
    println!("Component: {} ({})", context.id, context.address());
    println!();

    let consumer = InstanceFacade::from_context(context);
    let producer = InstanceFacade::from_context(ComponentContext::new("producer").with_output("out"));
    producer
        .instance()
        .connect("out", consumer.instance(), &input_port)?;

    let filter = Arc::new(WordFilter {
        min_length,
        accepted: AtomicUsize::new(0),
    });
    let shutdown = CancellationToken::new();
    let worker = {
        let input = consumer.input().port(&input_port)?;
        let filter = filter.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { input.run(filter.as_ref(), shutdown).await })
    };

    println!("📨 Sending words (each send waits for ack/fail):");
    let out = producer.output().port("out")?;
    for word in input_text.split_whitespace() {
        match out.send(json!({ "word": word })).await {
            Ok(()) => println!("  ✅ {} → acked", word),
            Err(e) => println!("  ❌ {} → {}", word, e),
        }
    }

    shutdown.cancel();
    let processed = worker.await?;

    // Same bridge, callback flavour: the chain's outcome reaches a completion callback
    let (callback, completed) = CompletionCallback::channel();
    let total = then(
        async { Ok(filter.accepted.load(Ordering::SeqCst)) },
        consumer.on_success::<usize>(callback.clone()),
        consumer.on_reject::<usize>(callback),
    )
    .await?;

    println!();
    println!("📊 Results:");
    println!("🔢 Messages processed: {}", processed);
    println!("✅ Words accepted: {}", total);
    println!("📬 Completion callback: {}", completed.await?);
    println!("⏱️  Total Time: {:?}", start_time.elapsed());

    Ok(())
}
