//! Offline fallback advice
//!
//! When the delivery endpoint is unreachable the submitter still answers:
//! a static first-aid table is searched for the first entry whose keywords
//! match the submitted text, and the reply combines that entry's severity
//! and advice. When nothing matches, a generic saved-for-retry notice is
//! synthesized instead. The table is only consulted on the failure path.

use std::fmt;

/// Severity tier attached to a fallback advice entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Self-care is usually enough
    Low,
    /// See a doctor if it persists
    Moderate,
    /// Needs prompt medical attention
    High,
    /// Emergency care, immediately
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "LOW",
            Severity::Moderate => "MODERATE",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// A single entry in the offline advice table
#[derive(Debug, Clone, Copy)]
pub struct AdviceEntry {
    /// Keywords matched case-insensitively against the submitted text
    pub keywords: &'static [&'static str],
    /// Severity tier shown in the synthesized reply
    pub severity: Severity,
    /// Advice text
    pub advice: &'static str,
}

/// Static advice table, checked in order; first match wins
pub const ADVICE_TABLE: &[AdviceEntry] = &[
    AdviceEntry {
        keywords: &["snake bite", "snakebite"],
        severity: Severity::Critical,
        advice: "Keep the bitten limb still and below heart level. Do not cut the wound or try to suck out venom. Get to emergency care immediately.",
    },
    AdviceEntry {
        keywords: &["chest pain", "heart attack"],
        severity: Severity::Critical,
        advice: "Sit down, stay calm and call emergency services now. Chew an aspirin if you are not allergic.",
    },
    AdviceEntry {
        keywords: &["choking", "can't breathe", "cannot breathe"],
        severity: Severity::Critical,
        advice: "If the person cannot cough or speak, give five back blows between the shoulder blades, then five abdominal thrusts. Call emergency services.",
    },
    AdviceEntry {
        keywords: &["burn", "scald"],
        severity: Severity::High,
        advice: "Cool the burn under cool running water for 20 minutes. Do not apply ice, butter or ointments. Cover loosely with a clean cloth and seek care for large or deep burns.",
    },
    AdviceEntry {
        keywords: &["cut", "bleeding", "wound"],
        severity: Severity::Moderate,
        advice: "Apply firm pressure with a clean cloth until the bleeding stops, then rinse and cover. Seek care if the wound is deep, dirty or will not stop bleeding.",
    },
    AdviceEntry {
        keywords: &["fever", "high temperature"],
        severity: Severity::Moderate,
        advice: "Rest and drink plenty of fluids. Paracetamol can reduce fever. See a doctor if it exceeds three days or climbs above 39.5 C.",
    },
    AdviceEntry {
        keywords: &["dizzy", "dehydration", "dehydrated"],
        severity: Severity::Moderate,
        advice: "Sit or lie down and sip water or an oral rehydration solution. Seek care if dizziness persists or you cannot keep fluids down.",
    },
    AdviceEntry {
        keywords: &["sprain", "twisted ankle"],
        severity: Severity::Low,
        advice: "Rest the joint, apply ice wrapped in a cloth, use a compression bandage and keep it elevated. See a doctor if you cannot bear weight.",
    },
    AdviceEntry {
        keywords: &["rash", "itching", "hives"],
        severity: Severity::Low,
        advice: "Wash the area with mild soap, avoid scratching and try a cold compress. Seek urgent care if the rash spreads fast or breathing is affected.",
    },
    AdviceEntry {
        keywords: &["headache", "migraine"],
        severity: Severity::Low,
        advice: "Rest in a quiet, dark room and drink water. See a doctor if the headache is sudden and severe or follows an injury.",
    },
];

/// Reply used when no advice entry matches the submitted text
pub const GENERIC_REPLY: &str = "You're offline right now. Your message was saved and will be sent automatically once the connection returns.";

/// Find the first advice entry matching `text`
///
/// Matching is a case-insensitive substring test against any keyword.
pub fn match_advice(text: &str) -> Option<&'static AdviceEntry> {
    let needle = text.to_lowercase();
    ADVICE_TABLE
        .iter()
        .find(|entry| entry.keywords.iter().any(|k| needle.contains(k)))
}

/// Synthesize the assistant reply used when delivery fails
pub fn fallback_reply(text: &str) -> String {
    match match_advice(text) {
        Some(entry) => format!("[{}] {}", entry.severity, entry.advice),
        None => GENERIC_REPLY.to_string(),
    }
}
