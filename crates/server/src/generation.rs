//! Prompt construction and Ollama-backed text generation.
//!
//! Every generation endpoint goes through [`Generator::generate_or_fallback`]:
//! a reachable Ollama instance produces real content, anything else (refused
//! connection, timeout, non-2xx, empty completion) falls back to the step's
//! canned mock text so the studio stays usable without a local model.

use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Settings;

pub struct PromptSpec {
    pub system: String,
    pub user: String,
}

impl PromptSpec {
    /// The flattened prompt sent to the completion endpoint.
    pub fn full_prompt(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

pub fn screenplay_prompt(story: &str, genre: &str) -> PromptSpec {
    PromptSpec {
        system: format!(
            "You are a professional Hollywood screenwriter. Write a screenplay in {} \
             cinematic style. Use proper screenplay format: Scene headings in ALL CAPS, \
             Character names centered, Emotional depth, Strong pacing. Visual storytelling.",
            genre.to_uppercase()
        ),
        user: format!("Story idea: {story}"),
    }
}

pub fn characters_prompt(story: &str) -> PromptSpec {
    PromptSpec {
        system: "You are an expert character psychologist. Create deep psychological \
                 character profiles. Include Age, Background, Motivation, Internal conflict, \
                 Fear, Moral flaw."
            .to_string(),
        user: format!("Based on this story idea: {story}"),
    }
}

pub fn director_prompt(screenplay: &str) -> PromptSpec {
    PromptSpec {
        system: "You are a world-class Film Director and Cinematographer. Analyze the \
                 screenplay and create a director's shot breakdown. For each scene provide: \
                 Camera angle, Shot type, Lighting style, Color grading, Emotional tone."
            .to_string(),
        user: format!("Screenplay: {screenplay}"),
    }
}

pub fn sound_design_prompt(screenplay: &str) -> PromptSpec {
    PromptSpec {
        system: "You are a professional Sound Designer. Create a sound design plan for the \
                 screenplay. Include: Background music genre, Ambient layer details, Foley \
                 effects, Dialogue treatment."
            .to_string(),
        user: format!("Screenplay: {screenplay}"),
    }
}

pub fn pitch_deck_prompt(story: &str) -> PromptSpec {
    PromptSpec {
        system: "You are a Hollywood Producer. Create a professional movie pitch document. \
                 Include: Logline, Tagline, Genre, Target audience, Comparable films, Why \
                 this film will succeed."
            .to_string(),
        user: format!("Story idea: {story}"),
    }
}

pub fn mock_screenplay(story: &str, genre: &str) -> String {
    format!(
        "INT. OFFICE - DAY\n\n\
         A dimly lit room. DETECTIVE MILLER sits behind a desk, nursing a glass of \
         whiskey. Rain hammers against the window.\n\n\
         MILLER\n(V.O.)\n\
         They say time heals all wounds. But in this city, time just festers.\n\n\
         He looks at the photo of a missing girl on his desk.\n\n\
         MILLER\nI'm coming for you, kid.\n\n\
         This is a MOCK screenplay for the story: \"{story}\" in the genre \"{genre}\".\n\
         Please ensure Ollama is running for real AI generation."
    )
}

pub fn mock_characters() -> String {
    "**Detective Miller**\n\
     Age: 45\n\
     Motivation: Redemption for a past failure.\n\
     Flaw: Alcoholism and cynicism.\n\n\
     **The antagonist**\n\
     Age: Unknown\n\
     Motivation: Chaos.\n"
        .to_string()
}

pub fn mock_director_notes() -> String {
    "**Scene 1**\n\
     Camera: Low angle, tracking shot via the window.\n\
     Lighting: Low-key, noir style with heavy shadows.\n\
     Color: Desaturated blue cold tones.\n"
        .to_string()
}

pub fn mock_sound_design() -> String {
    "**Scene 1**\n\
     Music: Slow, melancholic jazz saxophone.\n\
     SFX: Heavy rain, distant sirens, glass clinking.\n"
        .to_string()
}

pub fn mock_pitch_deck() -> String {
    "**Title:** The Last Case\n\
     **Logline:** A burnt-out detective must face his demons to save a missing girl.\n\
     **Target Audience:** 18-35, fans of Neo-Noir.\n\
     **Comparable Films:** Se7en, Blade Runner.\n"
        .to_string()
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
}

pub struct Generator {
    http: Client,
    url: String,
    model: String,
    options: OllamaOptions,
}

impl Generator {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.ollama_timeout_seconds))
            .build()
            .context("failed to build Ollama HTTP client")?;
        Ok(Self {
            http,
            url: settings.ollama_url.clone(),
            model: settings.ollama_model.clone(),
            options: OllamaOptions {
                temperature: settings.temperature,
                num_predict: settings.num_predict,
            },
        })
    }

    async fn query_ollama(&self, prompt: &PromptSpec) -> anyhow::Result<String> {
        let body: OllamaGenerateResponse = self
            .http
            .post(&self.url)
            .json(&OllamaGenerateRequest {
                model: &self.model,
                prompt: prompt.full_prompt(),
                stream: false,
                options: self.options,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if body.response.trim().is_empty() {
            bail!("model returned an empty completion");
        }
        Ok(body.response)
    }

    pub async fn generate_or_fallback(
        &self,
        prompt: &PromptSpec,
        fallback: impl FnOnce() -> String,
    ) -> String {
        match self.query_ollama(prompt).await {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, model = %self.model, "ollama generation failed; serving mock content");
                fallback()
            }
        }
    }
}
