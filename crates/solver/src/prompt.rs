//! Prompt templates for the solve and explain operations.
//!
//! The solve prompt is the contract with the generator: it fixes the five
//! mutually exclusive problem categories and the record shape the
//! normalizer expects on the way back. Wording changes here change the
//! failure rate of `normalize`, so edit with care.

use inkmath_core::VariableBindings;

const SOLVE_RULES: &str = r#"You have been given an image with some mathematical expressions, equations, or graphical problems, and you need to solve them.
IMPORTANT: Only analyze the most recently drawn equation/expression in the image. Ignore any previous answers or drawings that might appear in the image. Focus only on the newest, freshest marks in the image.
Note: Use the PEMDAS rule for solving mathematical expressions. PEMDAS stands for the Priority Order: Parentheses, Exponents, Multiplication and Division (from left to right), Addition and Subtraction (from left to right).
For example:
Q. 2 + 3 * 4
(3 * 4) => 12, 2 + 12 = 14.
Q. 2 + 3 + 5 * 4 - 8 / 2
5 * 4 => 20, 8 / 2 => 4, 2 + 3 => 5, 5 + 20 => 25, 25 - 4 => 21.
YOU CAN HAVE FIVE TYPES OF EQUATIONS/EXPRESSIONS IN THIS IMAGE, AND ONLY ONE CASE SHALL APPLY EVERY TIME:
1. Simple mathematical expressions like 2 + 2, 3 * 4, 5 / 6: solve and return the answer as a LIST OF ONE DICT [{'expr': given expression, 'result': calculated answer}].
2. Set of equations like x^2 + 2x + 1 = 0, 3y + 4x = 0: solve for the given variables and return a COMMA SEPARATED LIST OF DICTS, one per variable, e.g. {'expr': 'x', 'result': 2, 'assign': True} and {'expr': 'y', 'result': 5, 'assign': True}.
3. Assigning values to variables like x = 4, y = 5: assign the values and include 'assign': True in each dict, keeping the variable as 'expr' and the value as 'result'. RETURN AS A LIST OF DICTS.
4. Graphical math problems (word problems represented as a drawing, such as collisions, trigonometric setups, Pythagorean triangles, run tallies from a wagon wheel). PAY CLOSE ATTENTION TO DIFFERENT COLORS IN THESE PROBLEMS. Return a LIST OF ONE DICT [{'expr': given expression, 'result': calculated answer}].
5. Abstract concepts a drawing might show (love, hate, jealousy, patriotism, a historic reference to war, invention, discovery, quote). Use the same format, where 'expr' is the explanation of the drawing and 'result' is the abstract concept.
For complex expressions, follow these additional guidelines:
- For calculus problems:
  * Derivatives: show each step of differentiation with proper notation, e.g. $$\frac{d}{dx}(3x^2 + 2x + 1) = 6x + 2$$.
  * Integrals: show the step-by-step integration process, including substitutions or identities used, and the constant of integration for indefinite integrals.
  * Limits: show the evaluation with proper notation, e.g. $$\lim_{x \to 2} (x^2 + 3x - 2) = 8$$.
  * Partial derivatives: use $\partial$ notation and show steps.
  * Multiple integrals: show the step-by-step evaluation of double or triple integrals.
  * Series expansions: include Taylor/Maclaurin series with proper notation.
  * Differential equations: show the solution process for ODEs/PDEs with initial/boundary conditions.
  * Vector calculus: include gradient, divergence, and curl with proper vector notation.
- For matrix operations: show intermediate steps for determinant, inverse, or multiplication.
- For trigonometric identities: show the step-by-step simplification using appropriate identities.
- For complex numbers: express answers in standard form (a + bi) and show conversions if needed.
- For systems of equations: use an appropriate method (substitution, elimination, matrix) and show all steps.
- For word problems: extract relevant quantities, set up equations, and solve systematically.
- For probability problems: show the complete probability tree or combinatorial reasoning.
- For statistical calculations: show all steps for mean, standard deviation, or regression.
- For algebraic expressions: factor completely, simplify, and show all manipulations.
Make sure to use extra backslashes for escape characters, e.g. \f becomes \\f and \n becomes \\n."#;

/// Render the solve prompt, embedding the caller's variable bindings for
/// substitution-aware solving.
pub fn solve_prompt(variables: &VariableBindings) -> String {
    let vars_json = serde_json::to_string(variables).unwrap_or_else(|_| "{}".into());
    format!(
        "{SOLVE_RULES}\n\
         Here is a dictionary of user-assigned variables. If the given expression has any of these variables, use its actual value from this dictionary accordingly: {vars_json}.\n\
         DO NOT USE BACKTICKS OR MARKDOWN FORMATTING.\n\
         PROPERLY QUOTE THE KEYS AND VALUES IN THE DICTIONARY FOR EASIER PARSING."
    )
}

const EXPLAIN_RULES: &str = r#"Provide a detailed step-by-step mathematical explanation with the following strict formatting rules:

1. STRUCTURE REQUIREMENTS:
- Begin with a clear statement of the problem
- Use numbered steps for each part of the solution
- End with a clear final answer
- Separate steps with blank lines for readability

2. MATHEMATICAL NOTATION:
- For inline math: wrap with single dollar signs like $x^2$
- For display math: wrap with double dollar signs like $$\int f(x) dx$$
- Always escape special characters (e.g. tan^{-1} not tan^-1)
- Use proper LaTeX notation for all symbols

3. CONTENT REQUIREMENTS:
- Explain each transformation clearly
- Show intermediate steps
- Highlight key mathematical rules used
- Keep technical language precise but accessible

4. FORMAT EXAMPLE:
To solve the integral $$\int \tan^{-1}(x) \, dx$$, we use integration by parts.

**Step 1: Choose u and dv.**
Let $u = \tan^{-1}(x)$
Let $dv = dx$

**Step 2: Differentiate and integrate.**
$$du = \frac{1}{1+x^2} dx$$
$$v = x$$

[...additional steps...]

The final result is:
$$\int \tan^{-1}(x) \, dx = x \tan^{-1}(x) - \frac{1}{2}\ln(1+x^2) + C$$

Now explain this problem:"#;

/// Render the explanation prompt for the final conversational turn.
pub fn explain_prompt(question: &str) -> String {
    format!("{EXPLAIN_RULES}\nUser's question: {question}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn solve_prompt_embeds_variables() {
        let mut vars = VariableBindings::new();
        vars.insert("x".into(), json!(4));
        vars.insert("y".into(), json!("5"));

        let prompt = solve_prompt(&vars);
        assert!(prompt.contains(r#"{"x":4,"y":"5"}"#));
        assert!(prompt.contains("PEMDAS"));
        assert!(prompt.contains("FIVE TYPES"));
        assert!(prompt.contains("DO NOT USE BACKTICKS"));
    }

    #[test]
    fn solve_prompt_with_no_variables() {
        let prompt = solve_prompt(&VariableBindings::new());
        assert!(prompt.contains("{}"));
    }

    #[test]
    fn explain_prompt_ends_with_question() {
        let prompt = explain_prompt("Why does integration by parts apply?");
        assert!(prompt.contains("LaTeX"));
        assert!(prompt.ends_with("User's question: Why does integration by parts apply?"));
    }
}
