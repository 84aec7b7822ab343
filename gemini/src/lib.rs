//! # Gemini travel assistant
//!
//! Client for Google's Gemini `generateContent` endpoint, primed with the
//! AventuraBus travel-assistant prompt.
//!
//! ## Example
//!
//! ```no_run
//! use aventura_gemini::{GeminiClient, DEFAULT_API_URL};
//!
//! # async fn run() -> Result<(), aventura_gemini::GeminiError> {
//! let client = GeminiClient::new(std::env::var("GEMINI_API_KEY").unwrap_or_default(), DEFAULT_API_URL);
//! let reply = client.ask("¿Qué lugares visitar en Cuenca?").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::{GeminiClient, DEFAULT_API_URL, FALLBACK_REPLY, SYSTEM_PROMPT};
pub use error::GeminiError;
pub use types::{GenerateContentRequest, GenerateContentResponse};
