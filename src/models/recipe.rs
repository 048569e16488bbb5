use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Difficulty levels the generator is instructed to choose from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Intermediate,
    Hard,
}

/// Which list layout a recipe uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RecipeMode {
    /// Flat `ingredients` + `cookingInstructions`.
    Simple,
    /// `sublists` linked to `subIngredients` + `subInstructions`.
    Complex,
    /// Both layouts populated.
    Mixed,
    /// Neither layout populated.
    Empty,
}

/// Special equipment is emitted either as one string or as a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Equipment {
    Single(String),
    List(Vec<String>),
}

impl Default for Equipment {
    fn default() -> Self {
        Equipment::Single(String::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Ingredient {
    #[serde(rename = "nameOfIngredient")]
    #[garde(length(min = 1, max = 300))]
    pub name_of_ingredient: String,

    #[serde(default)]
    #[garde(skip)]
    pub ingredient_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Instruction {
    #[garde(length(min = 1))]
    pub instruction: String,

    #[serde(default)]
    #[garde(skip)]
    pub instruction_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Sublist {
    #[garde(length(min = 1, max = 200))]
    pub name: String,

    #[garde(length(min = 1))]
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubIngredient {
    #[garde(skip)]
    pub sublist_name: String,

    #[garde(skip)]
    pub sublist_id: String,

    #[garde(length(min = 1, max = 300))]
    pub name_of_ingredient: String,

    #[serde(rename = "ingredient_id", default)]
    #[garde(skip)]
    pub ingredient_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubInstruction {
    #[garde(skip)]
    pub sublist_name: String,

    #[garde(skip)]
    pub sublist_id: String,

    #[garde(length(min = 1))]
    pub instruction: String,

    #[serde(rename = "instruction_id", default)]
    #[garde(skip)]
    pub instruction_id: String,
}

/// Recipe document the vision model is prompted to produce.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[garde(length(min = 1, max = 200))]
    pub name_of_dish: String,

    #[garde(skip)]
    pub difficulty_level: Difficulty,

    #[garde(length(min = 1, max = 100))]
    pub time_to_cook: String,

    #[garde(length(min = 1, max = 100))]
    pub number_of_servings: String,

    #[serde(default)]
    #[garde(skip)]
    pub special_equipment: Equipment,

    #[serde(default)]
    #[garde(skip)]
    pub category_name: Option<String>,

    #[serde(default)]
    #[garde(skip)]
    pub image_url: Option<String>,

    #[serde(default)]
    #[garde(dive)]
    pub ingredients: Vec<Ingredient>,

    #[serde(default)]
    #[garde(dive)]
    pub cooking_instructions: Vec<Instruction>,

    #[serde(default)]
    #[garde(dive)]
    pub sublists: Vec<Sublist>,

    #[serde(default)]
    #[garde(dive)]
    pub sub_ingredients: Vec<SubIngredient>,

    #[serde(default)]
    #[garde(dive)]
    pub sub_instructions: Vec<SubInstruction>,
}

impl Recipe {
    pub fn mode(&self) -> RecipeMode {
        let simple = !self.ingredients.is_empty() || !self.cooking_instructions.is_empty();
        let complex = !self.sublists.is_empty()
            || !self.sub_ingredients.is_empty()
            || !self.sub_instructions.is_empty();

        match (simple, complex) {
            (true, false) => RecipeMode::Simple,
            (false, true) => RecipeMode::Complex,
            (true, true) => RecipeMode::Mixed,
            (false, false) => RecipeMode::Empty,
        }
    }

    /// Every way this recipe deviates from the generation schema. Empty means conforming.
    pub fn schema_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let Err(report) = self.validate() {
            for (path, error) in report.iter() {
                issues.push(format!("{path}: {error}"));
            }
        }

        match self.mode() {
            RecipeMode::Simple => {
                if self.ingredients.is_empty() {
                    issues.push("simple mode recipe has no ingredients".to_string());
                }
                if self.cooking_instructions.is_empty() {
                    issues.push("simple mode recipe has no cooking instructions".to_string());
                }
            }
            RecipeMode::Complex => {
                let linked = |name: &str, id: &str| {
                    self.sublists.iter().any(|s| s.name == name && s.id == id)
                };
                for item in &self.sub_ingredients {
                    if !linked(&item.sublist_name, &item.sublist_id) {
                        issues.push(format!(
                            "sub-ingredient '{}' references unknown sublist '{}'",
                            item.name_of_ingredient, item.sublist_name
                        ));
                    }
                }
                for item in &self.sub_instructions {
                    if !linked(&item.sublist_name, &item.sublist_id) {
                        issues.push(format!(
                            "sub-instruction references unknown sublist '{}'",
                            item.sublist_name
                        ));
                    }
                }
            }
            RecipeMode::Mixed => {
                issues.push("recipe populates both simple and complex lists".to_string())
            }
            RecipeMode::Empty => issues.push("recipe has no ingredients or instructions".to_string()),
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn simple_recipe() -> serde_json::Value {
        json!({
            "nameOfDish": "Spaghetti Pomodoro",
            "difficultyLevel": "easy",
            "timeToCook": "30 min",
            "numberOfServings": "4 servings",
            "specialEquipment": "",
            "ingredients": [
                { "nameOfIngredient": "8 oz spaghetti noodles", "ingredient_id": "a" },
                { "nameOfIngredient": "Kosher salt, to taste", "ingredient_id": "b" }
            ],
            "cookingInstructions": [
                { "instruction": "Boil the pasta.", "instruction_id": "c" }
            ],
            "sublists": [],
            "subIngredients": [],
            "subInstructions": []
        })
    }

    #[test]
    fn test_simple_recipe_conforms() {
        let recipe: Recipe = serde_json::from_value(simple_recipe()).unwrap();
        assert_eq!(recipe.mode(), RecipeMode::Simple);
        assert_eq!(recipe.difficulty_level, Difficulty::Easy);
        assert!(recipe.schema_issues().is_empty(), "{:?}", recipe.schema_issues());
    }

    #[test]
    fn test_complex_recipe_links() {
        let recipe: Recipe = serde_json::from_value(json!({
            "nameOfDish": "Banh Mi",
            "difficultyLevel": "intermediate",
            "timeToCook": "1 hr",
            "numberOfServings": "2 servings",
            "specialEquipment": ["grill pan"],
            "sublists": [{ "name": "Pickles", "id": "s1" }],
            "subIngredients": [
                { "sublistName": "Pickles", "sublistId": "s1", "nameOfIngredient": "1 carrot", "ingredient_id": "i1" },
                { "sublistName": "Sauce", "sublistId": "s2", "nameOfIngredient": "2 Tbsp mayo", "ingredient_id": "i2" }
            ],
            "subInstructions": [
                { "sublistName": "Pickles", "sublistId": "s1", "instruction": "Slice the carrot.", "instruction_id": "d1" }
            ]
        }))
        .unwrap();

        assert_eq!(recipe.mode(), RecipeMode::Complex);
        assert_eq!(
            recipe.special_equipment,
            Equipment::List(vec!["grill pan".to_string()])
        );
        let issues = recipe.schema_issues();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("Sauce"));
    }

    #[test]
    fn test_mixed_mode_flagged() {
        let mut value = simple_recipe();
        value["sublists"] = json!([{ "name": "Extra", "id": "x" }]);
        let recipe: Recipe = serde_json::from_value(value).unwrap();
        assert_eq!(recipe.mode(), RecipeMode::Mixed);
        assert!(!recipe.schema_issues().is_empty());
    }

    #[test]
    fn test_empty_dish_name_flagged() {
        let mut value = simple_recipe();
        value["nameOfDish"] = json!("");
        let recipe: Recipe = serde_json::from_value(value).unwrap();
        assert!(recipe
            .schema_issues()
            .iter()
            .any(|issue| issue.contains("name_of_dish")));
    }

    #[test]
    fn test_difficulty_parses_from_str() {
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(Difficulty::Intermediate.to_string(), "intermediate");
        assert!("expert".parse::<Difficulty>().is_err());
    }
}
