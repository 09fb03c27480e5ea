use std::path::Path;

use catalog::ProbabilityModel;

use crate::error::ParserError;

/// Deserialize the `segments`/`recombination` recombination probability
/// document (§6) into a [`ProbabilityModel`].
pub fn load_probability_model(path: impl AsRef<Path>) -> anyhow::Result<ProbabilityModel> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    serde_yaml::from_reader(file).map_err(|source| ParserError::ProbabilityDocument{
        path: path.display().to_string(),
        source,
    }.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_segments_and_recombination_keys() {
        let yaml = "\
segments:
  - context: V
    v_gene: TRAV1-1
    weight: 0.5
recombination:
  Vchewback: [0.5, 0.3, 0.2]
";
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probability.yaml");
        std::fs::write(&path, yaml).unwrap();
        let model = load_probability_model(&path).unwrap();
        assert_eq!(model.vdj_weights.len(), 1);
        assert!(model.junction.contains_key(&catalog::JunctionKind::Vchewback));
    }
}
