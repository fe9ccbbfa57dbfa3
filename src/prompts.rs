//! Task selector and the fixed prompt sent with each task.
//!
//! The form offers four analysis tasks. Each maps to exactly one prompt
//! constant below; keeping the wording here means a prompt tweak never
//! touches request construction in [`crate::pipeline::llm`], and tests can
//! assert on the text directly.

use std::fmt;

/// Prompt for [`TaskType::Objects`].
pub const OBJECTS_PROMPT: &str = "You are an image analysis assistant.
Describe all important objects in this image and their relationships.
Reply in clear bullet points.";

/// Prompt for [`TaskType::Text`].
pub const TEXT_PROMPT: &str = "Extract any readable text from this image, then provide a short summary of what the text is about.";

/// Prompt for [`TaskType::Scan`].
pub const SCAN_PROMPT: &str = "You are acting like an object scanner in a shopping app.
Focus only on the main object in the image and ignore the background as much as possible.
Identify the object and give details in this format:

1) Name of object
2) Category/type (e.g., 'electronic gadget', 'kitchen utensil', 'clothing', etc.)
3) Visible colors and material
4) Typical uses of this object
5) 3–5 possible search keywords a user could type to find this object online.

If you are not sure, still make your best reasonable guess and mention the uncertainty.";

/// Prompt for [`TaskType::Metadata`].
pub const METADATA_PROMPT: &str = "Analyze this image and provide:
1) A short caption,
2) Main objects,
3) Dominant colors,
4) Overall mood or context.";

/// Which analysis the user asked for.
///
/// Parsed from the `task_type` form field with [`TaskType::from_selector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskType {
    /// Describe objects and their relationships. (default)
    #[default]
    Objects,
    /// Extract and summarise visible text.
    Text,
    /// Identify the main object like a shopping-app scanner.
    Scan,
    /// Caption, objects, colours and mood.
    Metadata,
}

impl TaskType {
    /// Every task in the order the form lists them.
    pub const ALL: [TaskType; 4] = [
        TaskType::Objects,
        TaskType::Text,
        TaskType::Scan,
        TaskType::Metadata,
    ];

    /// Map a form value to a task. Unknown or empty values fall back to
    /// [`TaskType::default`].
    pub fn from_selector(value: &str) -> TaskType {
        match value.trim().to_ascii_lowercase().as_str() {
            "objects" => TaskType::Objects,
            "text" => TaskType::Text,
            "scan" => TaskType::Scan,
            "metadata" => TaskType::Metadata,
            _ => TaskType::default(),
        }
    }

    /// The selector string used in the form.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Objects => "objects",
            TaskType::Text => "text",
            TaskType::Scan => "scan",
            TaskType::Metadata => "metadata",
        }
    }

    /// Human-readable label for the `<select>` option.
    pub fn label(self) -> &'static str {
        match self {
            TaskType::Objects => "Describe objects",
            TaskType::Text => "Extract text",
            TaskType::Scan => "Scan main object",
            TaskType::Metadata => "Caption & metadata",
        }
    }

    /// The fixed prompt text sent alongside the image.
    pub fn prompt(self) -> &'static str {
        match self {
            TaskType::Objects => OBJECTS_PROMPT,
            TaskType::Text => TEXT_PROMPT,
            TaskType::Scan => SCAN_PROMPT,
            TaskType::Metadata => METADATA_PROMPT,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
