//! Pitch prompt assembly.

use std::fmt::Write;

use serde_json::Value;

use super::{CompletionRequest, Message};
use crate::services::pitch::PitchRequest;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates business insights.";

/// The four sections every pitch must contain, in order.
pub const PITCH_SECTIONS: [&str; 4] = [
    "A brief overview of the target customer's business and needs",
    "How the service provider's offerings align with these needs",
    "Specific value propositions and benefits",
    "Recommended approach and next steps",
];

/// Build the two-message exchange for one pitch.
#[must_use]
pub fn build_pitch_request(model: &str, request: &PitchRequest, search_result: &Value) -> CompletionRequest {
    CompletionRequest {
        model: model.to_owned(),
        messages: vec![Message::system(SYSTEM_PROMPT), Message::user(build_user_prompt(request, search_result))],
    }
}

fn build_user_prompt(request: &PitchRequest, search_result: &Value) -> String {
    let provider = &request.provider;
    let customer = &request.customer;
    let search_json = serde_json::to_string_pretty(search_result).unwrap_or_else(|_| "{}".to_string());

    let mut out = format!(
        "Based on the following information, generate a comprehensive business pitch that {} can use to approach {}.\n\n",
        provider.name, customer.name
    );
    let _ = writeln!(out, "Service Provider: {}", describe(&provider.name, &provider.url));
    let _ = writeln!(out, "Target Customer: {}", describe(&customer.name, &customer.url));
    let _ = writeln!(out, "Context: {}", request.context);
    let _ = write!(out, "\nSearch Results:\n{search_json}\n\nPlease provide:\n");
    for (i, section) in PITCH_SECTIONS.iter().enumerate() {
        let _ = writeln!(out, "{}. {section}", i + 1);
    }
    out.push_str("\nFormat the response in clear, professional language that can be used in a business pitch.");
    out
}

fn describe(name: &str, url: &str) -> String {
    if url.trim().is_empty() { name.to_owned() } else { format!("{name} ({url})") }
}
