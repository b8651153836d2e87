use crate::models::story::{AgeGroup, StoryRequest, StoryStyle};

/// System instruction sent alongside every story prompt
pub const STORY_SYSTEM_INSTRUCTION: &str = "You write delightful, kid-safe stories. Stay positive, non-scary, and encouraging. Avoid unsafe content and keep the story appropriate for children.";

fn age_guidance(age_group: AgeGroup) -> &'static str {
    match age_group {
        AgeGroup::ThreeToFive => {
            "Use short sentences, simple words, gentle pacing, and a warm reassuring tone."
        }
        AgeGroup::SixToEight => {
            "Use playful language, clear action, and a few descriptive details with easy reading level."
        }
        AgeGroup::NineToTwelve => {
            "Use richer vocabulary, stronger plot progression, and imaginative details while staying kid-safe."
        }
    }
}

fn style_guidance(style: StoryStyle) -> &'static str {
    match style {
        StoryStyle::SpaceAdventure => {
            "Set the story in a colorful space adventure with wonder and teamwork."
        }
        StoryStyle::FairyTale => {
            "Write as a modern fairy tale with kindness, magic, and a happy ending."
        }
        StoryStyle::JungleQuest => {
            "Set the story in a lively jungle quest with animal friends and discovery."
        }
        StoryStyle::UnderwaterMission => {
            "Set the story in an underwater mission with friendly sea creatures and bright scenery."
        }
    }
}

/// Instruction for the text model, one directive per line
pub fn build_story_prompt(request: &StoryRequest) -> String {
    [
        "Write a personalized children's story.".to_string(),
        "Requirements:".to_string(),
        format!("- Age group: {}", request.age_group().as_str()),
        format!("- Favorite character: {}", request.favorite_character()),
        format!("- Story style: {}", request.story_style().as_str()),
        format!("- {}", age_guidance(request.age_group())),
        format!("- {}", style_guidance(request.story_style())),
        "- Keep the story kid-safe, positive, non-scary, and encouraging.".to_string(),
        "- Include a clear beginning, middle, and end.".to_string(),
        "- Return a short title and the story text.".to_string(),
    ]
    .join("\n")
}

/// Instruction for the image model; the photo itself travels as inline data
pub fn build_image_prompt(request: &StoryRequest) -> String {
    [
        "Create a bright, playful children's book illustration.".to_string(),
        format!("Theme: {}", request.story_style().as_str()),
        format!(
            "Feature the child's favorite character: {}.",
            request.favorite_character()
        ),
        "Use a friendly, colorful, non-scary style with soft shapes and clear facial expressions."
            .to_string(),
        "Use the provided child photo only as reference for likeness and keep the image age-appropriate."
            .to_string(),
    ]
    .join(" ")
}
