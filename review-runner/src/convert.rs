//! Small, total conversions between the three independent severity/verdict
//! enums the model, the store, and the VCS adapters each define. Keeping
//! them as separate types per crate avoids a spurious cross-crate
//! dependency just for two four-variant enums.

use llm_service::{ModelSeverity, ModelVerdict};

pub fn severity_to_store(s: ModelSeverity) -> store::Severity {
    match s {
        ModelSeverity::Info => store::Severity::Info,
        ModelSeverity::Warning => store::Severity::Warning,
        ModelSeverity::Error => store::Severity::Error,
    }
}

pub fn severity_to_vcs(s: ModelSeverity) -> vcs_providers::Severity {
    match s {
        ModelSeverity::Info => vcs_providers::Severity::Info,
        ModelSeverity::Warning => vcs_providers::Severity::Warning,
        ModelSeverity::Error => vcs_providers::Severity::Error,
    }
}

pub fn verdict_to_store(v: ModelVerdict) -> store::Verdict {
    match v {
        ModelVerdict::Approve => store::Verdict::Approve,
        ModelVerdict::RequestChanges => store::Verdict::RequestChanges,
        ModelVerdict::Comment => store::Verdict::Comment,
    }
}

pub fn verdict_to_vcs(v: ModelVerdict) -> vcs_providers::Verdict {
    match v {
        ModelVerdict::Approve => vcs_providers::Verdict::Approve,
        ModelVerdict::RequestChanges => vcs_providers::Verdict::RequestChanges,
        ModelVerdict::Comment => vcs_providers::Verdict::Comment,
    }
}
