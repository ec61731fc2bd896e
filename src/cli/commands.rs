use crate::api::models::FridgeMatch;
use crate::{Error, Result};
use reqwest::Client;
use serde_json::json;

/// Split command-line arguments into ingredient names.
/// Each argument may itself hold a comma-separated list.
pub fn split_ingredients(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|ingredient| !ingredient.is_empty())
        .map(String::from)
        .collect()
}

/// Search a running server for recipes makeable from `ingredients`
pub async fn search(server_url: &str, ingredients: &[String], strict: bool) -> Result<()> {
    let ingredients = split_ingredients(ingredients);
    if ingredients.is_empty() {
        return Err(Error::Validation(
            "At least one ingredient is required".to_string(),
        ));
    }

    let client = Client::new();
    let url = format!("{}/api/search/frigo", server_url.trim_end_matches('/'));

    let response = client
        .post(&url)
        .json(&json!({ "ingredients": ingredients, "strict": strict }))
        .send()
        .await?
        .error_for_status()?;

    let matches: Vec<FridgeMatch> = response.json().await?;

    print_matches(&matches, strict);

    Ok(())
}

fn print_matches(matches: &[FridgeMatch], strict: bool) {
    if matches.is_empty() {
        if strict {
            println!("No recipes found in strict mode (try without --strict)");
        } else {
            println!("No recipes found");
        }
        return;
    }

    println!("Found {} recipe(s):\n", matches.len());

    for m in matches {
        let marker = if m.match_count == m.ingredient_count {
            "✓"
        } else {
            " "
        };
        println!(
            "{} recipe {:>6}  {}/{} ingredients  [{}]",
            marker,
            m.recipe_id,
            m.match_count,
            m.ingredient_count,
            m.matched_ingredients.join(", ")
        );
    }
}
