//! CLI command execution

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::Value;

use crate::negotiation::types::{coerce_memory, coerce_rate};
use crate::negotiation::{
    evaluate_offer, NegotiationInput, NegotiationSession, PolicyConfig, Verdict,
};
use crate::types::{LoadId, SessionId};

/// Load a policy file, merging over compiled-in defaults
pub fn load_policy(path: Option<&Path>) -> anyhow::Result<PolicyConfig> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("reading policy file {}", p.display()))?;
            let policy = serde_json::from_str(&text)
                .with_context(|| format!("parsing policy file {}", p.display()))?;
            Ok(policy)
        }
        None => Ok(PolicyConfig::default()),
    }
}

/// Evaluate one offer and print the decision as JSON
pub fn evaluate(
    loadboard_rate: f64,
    offer: f64,
    round: u32,
    miles: Option<f64>,
    prev_counter: Option<f64>,
    anchor_high: Option<f64>,
    policy_path: Option<&Path>,
) -> anyhow::Result<()> {
    let policy = load_policy(policy_path)?;
    let input = NegotiationInput {
        loadboard_rate,
        carrier_offer: offer,
        round_num: round,
        miles,
        prev_counter,
        anchor_high,
    };

    let decision = evaluate_offer(&input, &policy);
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

/// Replay a scripted sequence of carrier asks through a session.
///
/// The script is loose JSON, the shape voice webhooks send: rates may be
/// numbers or numeric strings. A `confirm-low` decision is auto-denied so
/// the next scripted ask plays as the restated number.
pub fn replay(script_path: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(script_path)
        .with_context(|| format!("reading replay script {}", script_path.display()))?;
    let payload: Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing replay script {}", script_path.display()))?;

    let loadboard_rate = coerce_rate(payload.get("loadboard_rate"));
    let miles = coerce_memory(payload.get("miles"));
    let policy = match payload.get("policy") {
        Some(v) => serde_json::from_value(v.clone()).context("parsing script policy block")?,
        None => PolicyConfig::default(),
    };
    let offers = match payload.get("offers").and_then(Value::as_array) {
        Some(a) if !a.is_empty() => a,
        _ => bail!("replay script needs a non-empty \"offers\" array"),
    };
    let load_id = payload
        .get("load_id")
        .and_then(Value::as_str)
        .unwrap_or("replay")
        .to_string();

    let mut session = NegotiationSession::new(
        SessionId::generate(),
        LoadId(load_id),
        loadboard_rate,
        miles,
        policy,
    );

    for raw in offers {
        let ask = coerce_rate(Some(raw));
        let decision = session.handle_offer(ask)?;
        println!("{}", serde_json::to_string(&decision)?);

        match decision.verdict {
            Verdict::ConfirmLow => {
                tracing::info!(quoted = decision.counter_rate, "auto-denying lowball in replay");
                session.confirm_low(false)?;
            }
            _ if decision.is_terminal() => break,
            _ => {}
        }
    }

    tracing::info!(
        state = ?session.state(),
        offers = session.offers().len(),
        rounds = session.rounds_used(),
        "replay finished"
    );
    Ok(())
}

/// Print the effective policy as JSON
pub fn print_policy(policy_path: Option<&Path>) -> anyhow::Result<()> {
    let policy = load_policy(policy_path)?;
    println!("{}", serde_json::to_string_pretty(&policy)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_policy_defaults_without_file() {
        let policy = load_policy(None).unwrap();
        assert_eq!(policy, PolicyConfig::default());
    }

    #[test]
    fn test_load_policy_missing_file_errors() {
        let result = load_policy(Some(Path::new("/nonexistent/policy.json")));
        assert!(result.is_err());
    }
}
