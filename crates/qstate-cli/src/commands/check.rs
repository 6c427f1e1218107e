use crate::support::{
    EXIT_FALSE, EXIT_TRUE, build_root_or_exit, fail, load_config_or_exit, parse_policy_or_exit,
    parse_probes_or_exit,
};
use qstate_kernel::Evaluation;
use serde_json::json;
use std::thread;
use std::time::Duration;

pub struct Args {
    pub probes: Vec<String>,
    pub any: bool,
    pub negate: bool,
    pub name: Option<String>,
    pub policy: Option<String>,
    pub fresh: bool,
    pub repeat: u32,
    pub interval_ms: u64,
    pub config: Option<String>,
    pub json: bool,
}

pub fn run(args: Args) {
    let config = load_config_or_exit(args.config.as_deref());
    let mut options = config.inspect;
    if let Some(policy) = args.policy.as_deref() {
        options.policy = parse_policy_or_exit(policy);
    }
    if args.fresh {
        options.use_cache = false;
    }
    let json_output = args.json || config.output.json;

    let specs = parse_probes_or_exit(&args.probes);
    let root = build_root_or_exit(&specs, args.any, args.negate, args.name.as_deref());
    tracing::info!(
        state = %root.canonical_name(),
        fingerprint = %root.fingerprint(),
        probes = specs.len(),
        queriers = root.queriers().len(),
        "inspecting"
    );

    let mut evaluations: Vec<Evaluation> = Vec::new();
    for round in 1..=args.repeat.max(1) {
        if round > 1 && args.interval_ms > 0 {
            thread::sleep(Duration::from_millis(args.interval_ms));
        }
        let evaluation = root
            .explain(options)
            .unwrap_or_else(|e| fail(format!("inspection failed: {e}")));
        tracing::debug!(round, value = evaluation.value, "round complete");
        evaluations.push(evaluation);
    }
    let verdict = evaluations.last().is_some_and(|e| e.value);

    if json_output {
        let rounds_json: Vec<_> = evaluations
            .iter()
            .enumerate()
            .map(|(idx, evaluation)| {
                json!({
                    "round": idx + 1,
                    "value": evaluation.value,
                    "fetchCount": evaluation.fetch_count(),
                    "evaluation": evaluation,
                })
            })
            .collect();
        let payload = json!({
            "state": root.name(),
            "canonicalName": root.canonical_name(),
            "fingerprint": root.fingerprint(),
            "policy": options.policy.to_string(),
            "useCache": options.use_cache,
            "verdict": verdict,
            "rounds": rounds_json,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).expect("json serialization")
        );
    } else {
        println!("qstate check {}", root.name());
        println!("  Canonical: {}", root.canonical_name());
        println!("  Fingerprint: {}", root.fingerprint());
        println!(
            "  Policy: {} ({})",
            options.policy,
            if options.use_cache { "cached" } else { "fresh" }
        );
        for (idx, evaluation) in evaluations.iter().enumerate() {
            println!(
                "  Round {}: {} ({} fetched)",
                idx + 1,
                evaluation.value,
                evaluation.fetch_count()
            );
            for leaf in evaluation.leaves() {
                let source = match leaf.cache_hit {
                    Some(true) => "cached",
                    _ => "fetched",
                };
                println!("    - {}: {} [{source}]", leaf.name, leaf.value);
            }
            if !evaluation.skipped.is_empty() {
                println!("    skipped: {}", evaluation.skipped.join(", "));
            }
        }
        println!("  Verdict: {}", if verdict { "true" } else { "false" });
    }

    std::process::exit(if verdict { EXIT_TRUE } else { EXIT_FALSE });
}
