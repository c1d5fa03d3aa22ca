use std::path::Path;

use anyhow::{bail, Context, Result};
use renderer::{check_fragment, check_vertex, Renderer, TransitionParameter, TransitionSource};
use showconfig::ShowConfig;
use tracing_subscriber::EnvFilter;

use crate::assets::{discover_images, discover_transitions, find_images, find_transitions};
use crate::cli::RunArgs;
use crate::paths::resolve_config_file;
use crate::settings::Settings;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let settings = load_settings(&args)?;
    let images = discover_images(&settings.images_dir)?;
    let transition_paths = discover_transitions(&settings.transitions_dir)?;

    check_vertex().context("built-in vertex stage failed to compile")?;
    let mut transitions = Vec::with_capacity(transition_paths.len());
    for path in &transition_paths {
        match load_checked_transition(path) {
            Ok(transition) => transitions.push(transition),
            Err(err) => tracing::warn!(path = %path.display(), "skipping transition: {err:#}"),
        }
    }
    if transitions.is_empty() {
        bail!(
            "none of the {} transitions in {} compiled",
            transition_paths.len(),
            settings.transitions_dir.display()
        );
    }

    let seed = settings.seed.unwrap_or_else(rand::random);
    tracing::info!(
        images = images.len(),
        transitions = transitions.len(),
        seed,
        pause = ?settings.timing.pause,
        transition = ?settings.timing.transition,
        "bootstrapping glideshow"
    );
    let config = settings.renderer_config(images, transitions, seed);
    Renderer::new(config).run()
}

/// Compiles every transition offline; errors when any of them fails.
pub fn check(args: &RunArgs) -> Result<()> {
    let settings = load_settings(args)?;
    let paths = discover_transitions(&settings.transitions_dir)?;
    check_vertex().context("built-in vertex stage failed to compile")?;

    let mut failed = 0usize;
    for path in &paths {
        let transition = match TransitionSource::from_file(path) {
            Ok(transition) => transition,
            Err(err) => {
                failed += 1;
                println!(
                    "FAIL  {:<28} {}",
                    TransitionSource::name_for(path),
                    path.display()
                );
                println!("      {err:#}");
                continue;
            }
        };
        match check_fragment(&transition.fragment) {
            Ok(_) => println!(
                "ok    {:<28} {}",
                transition.name,
                describe_parameters(&transition.fragment.parameters)
            ),
            Err(err) => {
                failed += 1;
                println!("FAIL  {:<28} {}", transition.name, path.display());
                for line in err.to_string().lines() {
                    println!("      {line}");
                }
            }
        }
    }

    println!("{} of {} transitions compiled", paths.len() - failed, paths.len());
    if failed > 0 {
        bail!("{failed} transition(s) failed to compile");
    }
    Ok(())
}

pub fn list(args: &RunArgs) -> Result<()> {
    let settings = load_settings(args)?;
    let images = find_images(&settings.images_dir)?;
    let transitions = find_transitions(&settings.transitions_dir)?;

    println!(
        "Images ({}) in {}:",
        images.len(),
        settings.images_dir.display()
    );
    for image in &images {
        println!("  {}", image.display());
    }
    println!(
        "Transitions ({}) in {}:",
        transitions.len(),
        settings.transitions_dir.display()
    );
    for path in &transitions {
        match TransitionSource::from_file(path) {
            Ok(transition) => println!(
                "  {:<28} {}",
                transition.name,
                describe_parameters(&transition.fragment.parameters)
            ),
            Err(err) => println!(
                "  {:<28} (unreadable: {err:#})",
                TransitionSource::name_for(path)
            ),
        }
    }
    Ok(())
}

pub fn print_shader(path: &Path) -> Result<()> {
    let transition = TransitionSource::from_file(path)?;
    print!("{}", transition.fragment.source);
    Ok(())
}

fn load_settings(args: &RunArgs) -> Result<Settings> {
    let config = match resolve_config_file(args.config.as_deref())? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            ShowConfig::load(&path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?
        }
        None => ShowConfig::default(),
    };
    Settings::resolve(&config, args)
}

fn load_checked_transition(path: &Path) -> Result<TransitionSource> {
    let transition = TransitionSource::from_file(path)?;
    check_fragment(&transition.fragment)?;
    for parameter in transition
        .fragment
        .parameters
        .iter()
        .filter(|parameter| parameter.default.is_none())
    {
        tracing::debug!(
            transition = %transition.name,
            parameter = %parameter.name,
            "parameter has no default; using zero"
        );
    }
    Ok(transition)
}

fn describe_parameters(parameters: &[TransitionParameter]) -> String {
    if parameters.is_empty() {
        return String::new();
    }
    let described: Vec<String> = parameters
        .iter()
        .map(|parameter| match &parameter.default {
            Some(default) => format!("{}={default}", parameter.name),
            None => format!("{}={}(0)", parameter.name, parameter.ty),
        })
        .collect();
    format!("[{}]", described.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_are_described_with_defaults() {
        let parameters = vec![
            TransitionParameter {
                ty: "float".into(),
                name: "smoothness".into(),
                default: Some("0.5".into()),
            },
            TransitionParameter {
                ty: "int".into(),
                name: "count".into(),
                default: None,
            },
        ];
        assert_eq!(
            describe_parameters(&parameters),
            "[smoothness=0.5, count=int(0)]"
        );
        assert_eq!(describe_parameters(&[]), "");
    }
}
