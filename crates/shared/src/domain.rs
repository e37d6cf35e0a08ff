use std::fmt;

use serde::{Deserialize, Serialize};

/// One backend generation call producing one category of studio content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStep {
    Screenplay,
    Characters,
    DirectorMode,
    SoundDesign,
    PitchDeck,
}

impl GenerationStep {
    pub const ALL: [GenerationStep; 5] = [
        GenerationStep::Screenplay,
        GenerationStep::Characters,
        GenerationStep::DirectorMode,
        GenerationStep::SoundDesign,
        GenerationStep::PitchDeck,
    ];

    pub fn endpoint_path(self) -> &'static str {
        match self {
            GenerationStep::Screenplay => "/generate_screenplay",
            GenerationStep::Characters => "/generate_characters",
            GenerationStep::DirectorMode => "/generate_director_mode",
            GenerationStep::SoundDesign => "/generate_sound_design",
            GenerationStep::PitchDeck => "/generate_pitch_deck",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GenerationStep::Screenplay => "Screenplay",
            GenerationStep::Characters => "Character Profiles",
            GenerationStep::DirectorMode => "Director's Notes",
            GenerationStep::SoundDesign => "Sound Design",
            GenerationStep::PitchDeck => "Pitch Deck",
        }
    }
}

impl fmt::Display for GenerationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The body-less chained steps that build on an already-generated screenplay.
///
/// The screenplay request carries its own payload and is deliberately not
/// representable here, so it can never be dispatched down the body-less path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpStep {
    Characters,
    DirectorMode,
    SoundDesign,
    PitchDeck,
}

impl FollowUpStep {
    pub const CHAIN: [FollowUpStep; 4] = [
        FollowUpStep::Characters,
        FollowUpStep::DirectorMode,
        FollowUpStep::SoundDesign,
        FollowUpStep::PitchDeck,
    ];

    pub fn step(self) -> GenerationStep {
        match self {
            FollowUpStep::Characters => GenerationStep::Characters,
            FollowUpStep::DirectorMode => GenerationStep::DirectorMode,
            FollowUpStep::SoundDesign => GenerationStep::SoundDesign,
            FollowUpStep::PitchDeck => GenerationStep::PitchDeck,
        }
    }

    /// `None` for the screenplay, which is not a follow-up.
    pub fn from_step(step: GenerationStep) -> Option<FollowUpStep> {
        match step {
            GenerationStep::Screenplay => None,
            GenerationStep::Characters => Some(FollowUpStep::Characters),
            GenerationStep::DirectorMode => Some(FollowUpStep::DirectorMode),
            GenerationStep::SoundDesign => Some(FollowUpStep::SoundDesign),
            GenerationStep::PitchDeck => Some(FollowUpStep::PitchDeck),
        }
    }

    /// Next step in the fixed generation chain, `None` after the pitch deck.
    pub fn next(self) -> Option<FollowUpStep> {
        match self {
            FollowUpStep::Characters => Some(FollowUpStep::DirectorMode),
            FollowUpStep::DirectorMode => Some(FollowUpStep::SoundDesign),
            FollowUpStep::SoundDesign => Some(FollowUpStep::PitchDeck),
            FollowUpStep::PitchDeck => None,
        }
    }
}

/// Download format for the exported project bible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Text,
    Markdown,
}

impl ExportFormat {
    pub fn from_path_segment(segment: &str) -> Option<ExportFormat> {
        match segment {
            "txt" => Some(ExportFormat::Text),
            "md" => Some(ExportFormat::Markdown),
            _ => None,
        }
    }

    pub fn path_segment(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_step_has_a_distinct_endpoint() {
        let mut paths: Vec<_> = GenerationStep::ALL
            .iter()
            .map(|step| step.endpoint_path())
            .collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), GenerationStep::ALL.len());
    }

    #[test]
    fn chain_walks_from_characters_to_pitch_deck() {
        let mut walked = vec![FollowUpStep::Characters];
        while let Some(next) = walked.last().copied().and_then(FollowUpStep::next) {
            walked.push(next);
        }
        assert_eq!(walked, FollowUpStep::CHAIN);
    }

    #[test]
    fn export_format_round_trips_path_segment() {
        assert_eq!(
            ExportFormat::from_path_segment("txt"),
            Some(ExportFormat::Text)
        );
        assert_eq!(
            ExportFormat::from_path_segment("md"),
            Some(ExportFormat::Markdown)
        );
        assert_eq!(ExportFormat::from_path_segment("pdf"), None);
    }
}
