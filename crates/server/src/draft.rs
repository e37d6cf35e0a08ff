//! In-memory project draft: the story concept plus one text slot per
//! generation step. Nothing is persisted; the draft lives for the process.

use shared::domain::{ExportFormat, GenerationStep};

#[derive(Debug, Default)]
pub struct ProjectDraft {
    pub story: Option<String>,
    pub genre: Option<String>,
    pub screenplay: Option<String>,
    pub characters: Option<String>,
    pub director_mode: Option<String>,
    pub sound_design: Option<String>,
    pub pitch_deck: Option<String>,
}

impl ProjectDraft {
    pub fn section(&self, step: GenerationStep) -> Option<&str> {
        match step {
            GenerationStep::Screenplay => self.screenplay.as_deref(),
            GenerationStep::Characters => self.characters.as_deref(),
            GenerationStep::DirectorMode => self.director_mode.as_deref(),
            GenerationStep::SoundDesign => self.sound_design.as_deref(),
            GenerationStep::PitchDeck => self.pitch_deck.as_deref(),
        }
    }

    pub fn set_section(&mut self, step: GenerationStep, content: String) {
        let slot = match step {
            GenerationStep::Screenplay => &mut self.screenplay,
            GenerationStep::Characters => &mut self.characters,
            GenerationStep::DirectorMode => &mut self.director_mode,
            GenerationStep::SoundDesign => &mut self.sound_design,
            GenerationStep::PitchDeck => &mut self.pitch_deck,
        };
        *slot = Some(content);
    }

    /// Concatenate every generated section, in chain order, into one
    /// document. `None` when nothing has been generated yet.
    pub fn render_bible(&self, format: ExportFormat) -> Option<String> {
        let sections: Vec<(&str, &str)> = GenerationStep::ALL
            .iter()
            .filter_map(|step| self.section(*step).map(|text| (step.title(), text)))
            .collect();
        if sections.is_empty() {
            return None;
        }

        let mut document = String::new();
        match format {
            ExportFormat::Text => {
                document.push_str("PROJECT BIBLE\n\n");
                for (title, text) in sections {
                    document.push_str(&title.to_uppercase());
                    document.push_str("\n\n");
                    document.push_str(text);
                    document.push_str("\n\n");
                }
            }
            ExportFormat::Markdown => {
                document.push_str("# Project Bible\n\n");
                for (title, text) in sections {
                    document.push_str("## ");
                    document.push_str(title);
                    document.push_str("\n\n");
                    document.push_str(text);
                    document.push_str("\n\n");
                }
            }
        }
        Some(document)
    }
}
