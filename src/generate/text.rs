// src/generate/text.rs
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{TextGenerator, Tone};

/// Canned posts keyed by tone.
pub struct MockTextGenerator;

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate_text(&self, _topic: &str, tone: Tone) -> Result<String> {
        let text = match tone {
            Tone::Professional => "🚀 Exciting developments in AI technology are reshaping our world! The latest breakthrough demonstrates unprecedented capabilities in machine learning and natural language processing. This innovation promises to revolutionize industries from healthcare to education. Stay tuned for more updates! #AI #Technology #Innovation",
            Tone::Funny => "🤖 Breaking: AI just learned to make coffee! ☕ Okay, not really... but it's getting pretty close! The latest tech breakthroughs are so mind-blowing, even robots are impressed. Who else is excited about the future? 🚀 #AI #TechHumor #FutureIsNow",
            Tone::Informative => "📊 Latest AI Breakthrough Analysis:\n\n✅ 40% improvement in processing speed\n✅ Enhanced accuracy in predictions\n✅ Reduced energy consumption\n✅ Better scalability for enterprises\n\nThis technology marks a significant milestone in artificial intelligence development. #AI #Technology #Innovation",
        };
        Ok(text.to_string())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// OpenAI Chat Completions. An empty key is accepted at construction and
/// rejected per call.
pub struct OpenAiTextGenerator {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiTextGenerator {
    /// `model_override` defaults to gpt-4o-mini.
    pub fn new(api_key: String, model_override: Option<&str>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("trend-studio/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            http,
            api_key,
            model: model_override.unwrap_or("gpt-4o-mini").to_string(),
        })
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: String,
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn generate_text(&self, topic: &str, tone: Tone) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("OPENAI_API_KEY not set");
        }

        let sys = format!(
            "You are a social media content creator. Create engaging posts with a {} tone.",
            tone.as_str()
        );
        let user = format!("Create a social media post about: {topic}");
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: &sys,
                },
                Msg {
                    role: "user",
                    content: &user,
                },
            ],
            max_tokens: 150,
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("openai returned {status}");
        }
        let body: Resp = resp.json().await.context("decoding openai response")?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("openai returned no content"))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
