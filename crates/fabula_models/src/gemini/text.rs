//! Gemini text client: premise generation and narrative expansion.

use crate::gemini::wire::{Content, GenerateContentRequest, GenerateContentResponse, Part};
use crate::gemini::{parse, API_KEY_VAR, BASE_URL};
use async_trait::async_trait;
use base64::Engine;
use fabula_core::{Narrative, Premise};
use fabula_error::{FabulaResult, StoryError, StoryErrorKind};
use fabula_interface::{PremiseRequest, StoryGenerator};
use reqwest::Client;
use tracing::{debug, instrument, warn};

/// Gemini-backed story generator.
#[derive(Debug, Clone)]
pub struct GeminiStoryGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiStoryGenerator {
    /// Create a client for `model`, reading the API key from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_API_KEY` is not set.
    #[instrument(skip_all)]
    pub fn new(model: impl Into<String>) -> FabulaResult<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| StoryError::new(StoryErrorKind::MissingApiKey))?;
        Ok(Self::with_api_key(api_key, model))
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            model: model.into(),
        }
    }

    /// Model name in use.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, parts: Vec<Part>) -> FabulaResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: None,
        };

        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        debug!(url = %url, model = %self.model, "Sending text generation request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                StoryError::new(StoryErrorKind::ApiRequest(format!("Request failed: {}", e)))
            })?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StoryError::new(StoryErrorKind::HttpError {
                status_code,
                message,
            })
            .into());
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            StoryError::new(StoryErrorKind::MalformedResponse(format!(
                "Failed to parse response body: {}",
                e
            )))
        })?;

        body.text()
            .ok_or_else(|| StoryError::new(StoryErrorKind::EmptyResponse).into())
    }

    fn premise_prompt(request: &PremiseRequest) -> String {
        let interests = if request.interests.trim().is_empty() {
            "magical adventures"
        } else {
            request.interests.trim()
        };

        format!(
            r#"Create a BASIC children's story idea from the attached photo and the child's interests.

INFORMATION:
- Name: {name}
- Age: {age} years old
- Interests: {interests}

GENERATE ONLY:
- An appealing title
- A general theme (adventure, fantasy, friendship, etc.)
- A brief two-to-three line summary
- A DETAILED physical description of the protagonist in the photo

MINIMAL JSON:
{{
    "title": "Creative book title",
    "theme": "adventure/fantasy/friendship/etc",
    "summary": "Brief summary of the adventure",
    "world_description": "Description of the world where the story happens (magical forest, outer space, fantastic city, etc.)",
    "protagonist": {{
        "name": "{name}",
        "appearance": "DETAILED description of the child's appearance in the photo (hair color, face shape, unique features, visible clothing)"
    }}
}}

IMPORTANT: Generate only this basic information. Do NOT generate pages or secondary characters. Respond with JSON only."#,
            name = request.child_name,
            age = request.age,
            interests = interests,
        )
    }

    fn expansion_prompt(premise: &Premise, page_count: u8) -> String {
        format!(
            r#"Extend this story idea into a COMPLETE children's story of {pages} pages.

BASE STORY:
- Title: {title}
- Theme: {theme}
- Summary: {summary}
- World: {world}
- Protagonist: {protagonist_name} - {protagonist_appearance}

GENERATE THE COMPLETE STORY:
- EXACTLY {pages} pages
- At most 3 characters (protagonist included)
- At most 3 important objects
- At most 3 distinct scenes
- Each page: at most 50 words of text

VERY DETAILED DESCRIPTIONS:
- Each character: complete physical description (clothing, hair color, features)
- Each object: shape, color, size, texture
- Each scene: environment, dominant colors, main elements, atmosphere
- Each page: DETAILED VISUAL description of what to illustrate, where every element is, what everyone is doing

COMPLETE JSON WITH NUMERIC IDS:
{{
    "title": "{title}",
    "theme": "{theme}",
    "summary": "{summary}",
    "lesson": "What the child will learn",
    "characters": [
        {{"id": 1, "name": "{protagonist_name}", "description": "{protagonist_appearance}"}},
        {{"id": 2, "name": "Secondary character name", "description": "Complete DETAILED physical description"}}
    ],
    "objects": [
        {{"id": 1, "name": "Object name", "description": "DETAILED description (shape, color, size, texture)"}}
    ],
    "scenes": [
        {{"id": 1, "name": "Scene name", "description": "DETAILED description (colors, lighting, elements, atmosphere)"}}
    ],
    "pages": [
        {{
            "number": 1,
            "text": "Page text (at most 50 words)",
            "scene_description": "DETAILED VISUAL description: what to illustrate, where each element is, relative positions, expressions",
            "character_ids": [1],
            "object_ids": [1],
            "scene_id": 1
        }}
    ]
}}

CRITICAL: Descriptions must be detailed enough that an illustrator could draw exactly the same thing twice. Respond with JSON only."#,
            pages = page_count,
            title = premise.title,
            theme = premise.theme,
            summary = premise.summary,
            world = premise.world_description,
            protagonist_name = premise.protagonist.name,
            protagonist_appearance = premise.protagonist.appearance,
        )
    }
}

#[async_trait]
impl StoryGenerator for GeminiStoryGenerator {
    #[instrument(skip(self, request), fields(child = %request.child_name))]
    async fn minimal_premise(&self, request: &PremiseRequest) -> FabulaResult<Premise> {
        let photo = base64::engine::general_purpose::STANDARD.encode(&request.photo.data);
        let parts = vec![
            Part::text(Self::premise_prompt(request)),
            Part::inline_data(request.photo.mime.clone(), photo),
        ];

        let text = self.generate(parts).await?;

        match parse::parse_premise(&text, &request.child_name) {
            Some(premise) => {
                debug!(title = %premise.title, "Generated premise");
                Ok(premise)
            }
            None => {
                warn!("Unparseable premise response, using fallback story");
                Ok(parse::fallback_premise(&request.child_name))
            }
        }
    }

    #[instrument(skip(self, premise), fields(title = %premise.title, page_count))]
    async fn expand_story(&self, premise: &Premise, page_count: u8) -> FabulaResult<Narrative> {
        let parts = vec![Part::text(Self::expansion_prompt(premise, page_count))];
        let text = self.generate(parts).await?;

        match parse::parse_narrative(&text, premise) {
            Some(narrative) => {
                debug!(pages = narrative.pages.len(), "Expanded narrative");
                Ok(narrative)
            }
            None => {
                warn!("Unparseable narrative response, using fallback story");
                Ok(parse::fallback_narrative(premise, page_count))
            }
        }
    }
}
