//! Text output for `show`, `reproduce`, and `new`.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::core::path::RunPath;
use crate::core::types::RunMetadata;
use crate::create::NewRunOutcome;

const SHOW_TEMPLATE: &str = include_str!("templates/show.txt");
const REPRODUCE_TEMPLATE: &str = include_str!("templates/reproduce.txt");
const NEW_RUN_TEMPLATE: &str = include_str!("templates/new_run.txt");

/// Template engine wrapper around minijinja.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("show", SHOW_TEMPLATE)
            .context("load show template")?;
        env.add_template("reproduce", REPRODUCE_TEMPLATE)
            .context("load reproduce template")?;
        env.add_template("new_run", NEW_RUN_TEMPLATE)
            .context("load new_run template")?;
        Ok(Self { env })
    }

    /// Path, `=` underline, then one section per metadata field.
    pub fn show(&self, path: &RunPath, run: &RunMetadata) -> Result<String> {
        let path = path.to_string();
        let underline = "=".repeat(path.chars().count());
        let rendered = self.env.get_template("show")?.render(context! {
            path => path,
            underline => underline,
            run => run,
        })?;
        Ok(rendered)
    }

    /// `git checkout` plus the `runs new` line that recreates `path` as `new_path`.
    pub fn reproduce(&self, path: &RunPath, new_path: &RunPath, run: &RunMetadata) -> Result<String> {
        let rendered = self.env.get_template("reproduce")?.render(context! {
            path => path.to_string(),
            new_path => new_path.to_string(),
            run => run,
        })?;
        Ok(rendered)
    }

    pub fn new_run(&self, outcome: &NewRunOutcome) -> Result<String> {
        let rendered = self.env.get_template("new_run")?.render(context! {
            path => outcome.path.to_string(),
            description => &outcome.description,
            full_command => &outcome.full_command,
        })?;
        Ok(rendered)
    }
}
