//! Sample recipe records for testing and demonstration.
//!
//! Each sample exercises a different part of the page layout.

/// The smallest useful recipe: one component, one ingredient, one step.
pub fn minimal_recipe() -> &'static str {
    r#"{
  "title": "Test Cake",
  "version": "v1",
  "components": [
    {
      "name": "Base",
      "ingredients": [["Flour", "100 g"]],
      "instructions": ["Mix."]
    }
  ]
}"#
}

/// A title with no components at all.
pub fn empty_recipe() -> &'static str {
    r#"{
  "title": "Nothing Yet",
  "version": "v0",
  "components": []
}"#
}

/// Multi-component layer cake with equipment, a custom rule length and
/// non-ASCII text.
pub fn layer_cake_recipe() -> &'static str {
    r#"{
  "title": "Carrot Graham Cake",
  "version": "v0.3.1",
  "line_length": 380,
  "components": [
    {
      "name": "Carrot Cake",
      "equipment": [["Quarter-sheet pan 9×13 in (23×33 cm)"], ["Stand mixer with paddle"]],
      "ingredients": [
        ["Butter, room temp", "115 g"],
        ["Light brown sugar", "120 g"],
        ["Granulated sugar", "50 g"],
        ["Eggs", "2"],
        ["Carrots, peeled and finely grated", "225 g"],
        ["Flour", "185 g"],
        ["Baking powder", "6 g"],
        ["Cinnamon", "2 g"],
        ["Kosher salt", "4 g"]
      ],
      "instructions": [
        "Heat the oven to 350°F.",
        "Cream the butter and sugars on medium-high for 2–3 minutes, until fluffy and pale yellow.",
        "Add the eggs one at a time, mixing on medium-high for 2–3 minutes after each.",
        "Mix in the carrots on low speed, then the dry ingredients, just until the batter comes together.",
        "Spread evenly in the pan and bake 25–30 minutes; the cake should bounce back slightly when poked."
      ]
    },
    {
      "name": "Graham Crust",
      "ingredients": [
        ["Graham cracker crumbs", "190 g"],
        ["Milk powder", "20 g"],
        ["Sugar", "25 g"],
        ["Kosher salt", "3 g"],
        ["Butter, melted", "55 g"],
        ["Heavy cream", "55 g"]
      ],
      "instructions": [
        "Toss the crumbs, milk powder, sugar and salt with your hands.",
        "Whisk the butter and cream, add to the dry ingredients and toss until small clusters form."
      ]
    },
    {
      "name": "Liquid Cheesecake",
      "ingredients": [
        ["Cream cheese", "225 g"],
        ["Sugar", "150 g"],
        ["Cornstarch", "6 g"],
        ["Kosher salt", "2 g"],
        ["Milk", "25 g"],
        ["Egg", "1"]
      ],
      "instructions": [
        "Paddle the cream cheese on low for 2 minutes until smooth.",
        "Add the sugar, then the cornstarch and salt, then the milk and egg; mix until silky.",
        "Bake in a 6×6 in pan for 15 minutes; the edges should be set and the centre still jiggly."
      ]
    }
  ]
}"#
}

/// Enough components and steps to need several pages.
pub fn multi_page_recipe() -> String {
    let components: Vec<String> = (1..=6)
        .map(|c| {
            let ingredients: Vec<String> = (1..=8)
                .map(|i| format!(r#"["Ingredient {c}.{i}", "{} g"]"#, i * 10))
                .collect();
            let steps: Vec<String> = (1..=6)
                .map(|s| {
                    format!(
                        r#""Step {s} of component {c}: fold gently, scrape the bowl and rest the mixture for a few minutes before continuing.""#
                    )
                })
                .collect();
            format!(
                r#"{{"name": "Component {c}", "ingredients": [{}], "instructions": [{}]}}"#,
                ingredients.join(", "),
                steps.join(", ")
            )
        })
        .collect();
    format!(
        r#"{{"title": "Long Recipe", "version": "v9", "components": [{}]}}"#,
        components.join(", ")
    )
}
