/// Instruction sent alongside the food photo. The model is asked for a single
/// JSON object matching [`crate::models::recipe::Recipe`].
pub const RECIPE_GENERATION_PROMPT: &str = r#"You generate cooking recipes as structured JSON. Look at the food in the attached image, decide what dish it most likely is, and write the best recipe you can for it.

Return exactly ONE JSON object and nothing else: no prose, no markdown, no code fences.

SCHEMA
{
  "categoryName": "string",
  "nameOfDish": "string",
  "difficultyLevel": "easy | intermediate | hard",
  "timeToCook": "string",
  "numberOfServings": "string",
  "specialEquipment": "string",
  "imageUrl": "string",
  "ingredients": [ { "nameOfIngredient": "string", "ingredient_id": "uuid-v4" } ],
  "cookingInstructions": [ { "instruction": "string", "instruction_id": "uuid-v4" } ],
  "sublists": [ { "name": "string", "id": "uuid-v4" } ],
  "subIngredients": [ { "sublistName": "string", "sublistId": "uuid-v4", "nameOfIngredient": "string", "ingredient_id": "uuid-v4" } ],
  "subInstructions": [ { "sublistName": "string", "sublistId": "uuid-v4", "instruction": "string", "instruction_id": "uuid-v4" } ]
}

MODES (pick exactly one, never mix)
- SIMPLE: "ingredients" and "cookingInstructions" are non-empty; "sublists", "subIngredients" and "subInstructions" are [].
- COMPLEX: "sublists", "subIngredients" and "subInstructions" are non-empty; "ingredients" and "cookingInstructions" are [].
- In COMPLEX mode every subIngredient and subInstruction must carry a "sublistName" and "sublistId" equal to the "name" and "id" of one entry in "sublists".

FIELD RULES
- Every *_id and sublist "id" is a unique lowercase UUID v4.
- "difficultyLevel" is exactly "easy", "intermediate" or "hard".
- "timeToCook" and "numberOfServings" are strings, e.g. "30 min", "4 servings".
- Keep every key; use "" for unknown strings and [] for the unused mode's arrays.
- "specialEquipment" names only non-basic tools, or "" if none.

INGREDIENT QUANTITIES
- Each ingredient starts with a quantity and usually a unit, then the name: "8 oz spaghetti noodles", "2 Tbsp olive oil", "1/2 cup grated parmesan cheese", "2 eggs".
- Seasonings without a measurable amount use a proxy ("1 pinch kosher salt") or end with ", to taste" / ", as needed".
- Never output a bare name, a vague amount ("some", "a handful") or a brand name.

INSTRUCTIONS
- Imperative, one action per step, in order, no duplicates.
- Prefer US units; metric may follow in parentheses.

Before answering, check every rule above and silently fix any item that breaks one. Output the JSON object only."#;
