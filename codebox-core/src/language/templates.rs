use crate::language::Language;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Canonical boilerplate for a brand-new file and for the reset-to-default
/// action.
pub fn default_source(language: Language) -> &'static str {
    match language {
        Language::C => {
            "#include <stdio.h>\n\nint main(void) {\n    printf(\"Hello, World!\\n\");\n    return 0;\n}\n"
        }
        Language::Cpp => {
            "#include <iostream>\n\nint main() {\n    std::cout << \"Hello, World!\" << std::endl;\n    return 0;\n}\n"
        }
        Language::Java => {
            "public class Main {\n    public static void main(String[] args) {\n        System.out.println(\"Hello, World!\");\n    }\n}\n"
        }
        Language::Javascript => "console.log(\"Hello, World!\");\n",
        Language::Python => "print(\"Hello, World!\")\n",
    }
}

/// A problem a file can be seeded from: the slug addresses the remote
/// template catalog, the title feeds local stub generation.
#[derive(Debug, Clone)]
pub struct ProblemRef {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct TemplateResponse {
    template: String,
}

/// Starter-template lookup for problem-backed files.
///
/// Resolution order: remote per-problem template, then a stub derived from
/// the problem title, then the generic boilerplate. Every step is
/// best-effort; a failure (network, non-OK status, parse) falls through to
/// the next step and is never surfaced to the caller.
pub struct TemplateProvider {
    client: Client,
    base_url: Option<String>,
}

impl TemplateProvider {
    pub fn new(base_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self { client, base_url }
    }

    pub async fn starter(&self, language: Language, problem: Option<&ProblemRef>) -> String {
        if let Some(problem) = problem {
            if let Some(remote) = self.fetch_remote(language, problem).await {
                return remote;
            }
            if let Some(stub) = title_stub(language, &problem.title) {
                return stub;
            }
        }
        default_source(language).to_string()
    }

    async fn fetch_remote(&self, language: Language, problem: &ProblemRef) -> Option<String> {
        let base = self.base_url.as_ref()?;
        let url = format!("{base}/templates/{}/{language}", problem.slug);
        debug!(%url, "fetching starter template");

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("template lookup failed for '{}': {e}", problem.slug);
                return None;
            }
        };
        let response = response.error_for_status().ok()?;
        match response.json::<TemplateResponse>().await {
            Ok(body) if !body.template.trim().is_empty() => Some(body.template),
            Ok(_) => None,
            Err(e) => {
                warn!("unparseable template for '{}': {e}", problem.slug);
                None
            }
        }
    }
}

/// Derives a function stub from a problem title: "Two Sum" yields a
/// `two_sum` (or `twoSum`, per language convention) skeleton. `None` when
/// the title has no usable words.
fn title_stub(language: Language, title: &str) -> Option<String> {
    let words: Vec<String> = title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect();
    if words.is_empty() {
        return None;
    }

    let snake = words.join("_");
    let camel = {
        let mut out = words[0].clone();
        for w in &words[1..] {
            let mut chars = w.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.extend(chars);
            }
        }
        out
    };

    let stub = match language {
        Language::C => format!(
            "#include <stdio.h>\n\nvoid {snake}(void) {{\n    // TODO: solve {title}\n}}\n\nint main(void) {{\n    {snake}();\n    return 0;\n}}\n"
        ),
        Language::Cpp => format!(
            "#include <iostream>\n\nvoid {snake}() {{\n    // TODO: solve {title}\n}}\n\nint main() {{\n    {snake}();\n    return 0;\n}}\n"
        ),
        Language::Java => format!(
            "public class Main {{\n    static void {camel}() {{\n        // TODO: solve {title}\n    }}\n\n    public static void main(String[] args) {{\n        {camel}();\n    }}\n}}\n"
        ),
        Language::Javascript => {
            format!("function {camel}() {{\n    // TODO: solve {title}\n}}\n\n{camel}();\n")
        }
        Language::Python => {
            format!("def {snake}():\n    # TODO: solve {title}\n    pass\n\n\n{snake}()\n")
        }
    };
    Some(stub)
}
