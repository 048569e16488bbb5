//! Upstream stream fixtures shaped like Ollama's `/api/generate` output

#![allow(dead_code)]

/// A food photo as the API receives it: base64 of a PNG header.
pub const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUg==";

/// A simple-mode recipe as the model is asked to produce it.
pub const SIMPLE_RECIPE_JSON: &str = r#"{
  "categoryName": "Italian",
  "nameOfDish": "Spaghetti Pomodoro",
  "difficultyLevel": "easy",
  "timeToCook": "30 min",
  "numberOfServings": "4 servings",
  "specialEquipment": "",
  "imageUrl": "",
  "ingredients": [
    { "nameOfIngredient": "8 oz spaghetti noodles", "ingredient_id": "5b1f9a9e-3c1d-4e4b-9a51-0c1f5f7d2a10" },
    { "nameOfIngredient": "1 cup canned crushed tomatoes", "ingredient_id": "8e6d3c44-0f7e-4c2a-b0c7-3d5c1a9e8f21" },
    { "nameOfIngredient": "Kosher salt, to taste", "ingredient_id": "c2a4e6f8-1b3d-4f5a-8c7e-9d0b2f4a6c32" }
  ],
  "cookingInstructions": [
    { "instruction": "Boil the spaghetti until al dente.", "instruction_id": "0a9b8c7d-6e5f-4a3b-9c1d-2e3f4a5b6c43" },
    { "instruction": "Toss with the warmed tomatoes and season.", "instruction_id": "1b2c3d4e-5f6a-4b7c-8d9e-0f1a2b3c4d54" }
  ],
  "sublists": [],
  "subIngredients": [],
  "subInstructions": []
}"#;

/// One NDJSON line carrying a text fragment.
pub fn token_line(fragment: &str) -> String {
    let line = serde_json::json!({
        "model": "llava:7b",
        "created_at": "2025-10-14T02:01:45.0148537Z",
        "response": fragment,
        "done": false,
    });
    format!("{line}\n")
}

/// The closing line Ollama sends once generation finishes.
pub fn done_line() -> String {
    let line = serde_json::json!({
        "model": "llava:7b",
        "response": "",
        "done": true,
        "total_duration": 1_234_567_u64,
    });
    format!("{line}\n")
}

/// Split `text` into small token fragments and render the full NDJSON body.
pub fn ndjson_body(text: &str, token_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut body = String::new();
    for token in chars.chunks(token_chars.max(1)) {
        body.push_str(&token_line(&token.iter().collect::<String>()));
    }
    body.push_str(&done_line());
    body
}

/// Cut a body into network chunks of `size` bytes, ignoring line boundaries.
pub fn chunk_bytes(body: &str, size: usize) -> Vec<Vec<u8>> {
    body.as_bytes().chunks(size.max(1)).map(<[u8]>::to_vec).collect()
}
