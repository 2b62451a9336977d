// SPDX-License-Identifier: MPL-2.0

//! Loading vertex data from Wavefront OBJ files.

use std::path::Path;

use crate::{object::VertexAttributes, Error, Result};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

impl From<tobj::Mesh> for VertexAttributes {
    fn from(mesh: tobj::Mesh) -> Self {
        // OBJ colors are RGB; ours carry alpha.
        let color = mesh
            .vertex_color
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 1.])
            .collect();

        Self {
            position: mesh.positions,
            color,
            normal: mesh.normals,
            texcoord: mesh.texcoords,
            indices: (!mesh.indices.is_empty()).then_some(mesh.indices),
        }
    }
}

/// Loads every model of the OBJ file at `path`, by name.
pub fn load_obj_models(path: &Path) -> Result<Vec<(String, VertexAttributes)>> {
    let (models, materials) = tobj::load_obj(path, &load_options())?;
    if let Err(e) = materials {
        tracing::debug!("Ignoring materials of {}: {}", path.display(), e);
    }
    tracing::info!("Loaded {} model(s) from {}", models.len(), path.display());

    Ok(models
        .into_iter()
        .map(|model| (model.name, model.mesh.into()))
        .collect())
}

/// Loads the OBJ file at `path` as a single indexed mesh.
///
/// Fails with [`Error::EmptyGeometry`] if the file holds no vertices.
pub fn load_obj(path: &Path) -> Result<VertexAttributes> {
    let merged = load_obj_models(path)?
        .into_iter()
        .map(|(_, attributes)| attributes)
        .fold(VertexAttributes::default(), merge);

    if merged.position.is_empty() {
        return Err(Error::EmptyGeometry(path.to_owned()));
    }

    Ok(merged)
}

/// Appends `next` to `acc`, offsetting its indices past the vertices already in `acc`.
fn merge(mut acc: VertexAttributes, next: VertexAttributes) -> VertexAttributes {
    let offset = acc.vertex_count() as u32;
    let next_count = next.vertex_count();
    let indices = next
        .indices
        .unwrap_or_else(|| (0..next_count as u32).collect());

    acc.indices
        .get_or_insert_with(|| (0..offset).collect())
        .extend(indices.into_iter().map(|i| i + offset));
    acc.position.extend(next.position);
    acc.color.extend(next.color);
    acc.normal.extend(next.normal);
    acc.texcoord.extend(next.texcoord);

    acc
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("arbor-{}-{}.obj", std::process::id(), name));
        fs::write(&path, contents).unwrap();

        path
    }

    #[test]
    fn quad_is_triangulated() {
        let path = write_temp(
            "quad",
            "o quad\n\
             v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             f 1 2 3 4\n",
        );

        let attributes = load_obj(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(attributes.vertex_count(), 4);
        assert_eq!(attributes.indices.as_ref().map(Vec::len), Some(6));
        assert_eq!(attributes.vertex(2), Some(crate::Vector3::new(1., 1., 0.)));
    }

    #[test]
    fn models_are_merged_with_offset_indices() {
        let path = write_temp(
            "pair",
            "o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
             o b\nv 0 0 1\nv 1 0 1\nv 0 1 1\nf 4 5 6\n",
        );

        let models = load_obj_models(&path).unwrap();
        let merged = load_obj(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(models.len(), 2);
        assert_eq!(models[1].0, "b");
        assert_eq!(merged.vertex_count(), 6);
        assert_eq!(merged.indices, Some(vec![0, 1, 2, 3, 4, 5]));
    }

    #[test]
    fn empty_file_is_rejected() {
        let path = write_temp("empty", "# nothing here\n");

        let result = load_obj(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(Error::EmptyGeometry(_))));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let result = load_obj(Path::new("/nonexistent/arbor.obj"));
        assert!(matches!(result, Err(Error::ObjLoad(_))));
    }

    #[test]
    fn vertex_colors_gain_alpha() {
        let mesh = tobj::Mesh {
            positions: vec![0.; 3],
            vertex_color: vec![0.1, 0.2, 0.3],
            ..Default::default()
        };

        let attributes = VertexAttributes::from(mesh);

        assert_eq!(attributes.color, vec![0.1, 0.2, 0.3, 1.]);
        assert_eq!(attributes.indices, None);
    }
}
