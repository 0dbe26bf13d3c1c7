//! Validate an edit script against a decoded asset

use hashbrown::HashSet;

use super::{CategoryEdit, EditScript, EditScriptError, ModelEdits, TrackEdits};
use crate::model::Model;
use crate::track::TrackGeometry;
use crate::track::boundary::MAX_RUN_LEN;

impl EditScript {
    /// Turn the `[model]` table into [`ModelEdits`] for `model`.
    ///
    /// A script without a `[model]` table compiles to an empty edit set.
    pub fn compile_model(&self, model: &Model) -> Result<ModelEdits, EditScriptError> {
        let mut edits = ModelEdits::new();
        let Some(script) = &self.model else {
            return Ok(edits);
        };
        let count = model.meshes.len();

        let mut seen_deleted = HashSet::new();
        for &mesh in &script.delete {
            check_mesh(mesh, count)?;
            if !seen_deleted.insert(mesh) {
                return Err(EditScriptError::DuplicateMesh(mesh));
            }
            edits.deleted.insert(mesh);
        }

        let mut seen_edited = HashSet::new();
        for edit in &script.edits {
            check_mesh(edit.mesh, count)?;
            if !seen_edited.insert(edit.mesh) {
                return Err(EditScriptError::DuplicateMesh(edit.mesh));
            }
            let target = &model.meshes[edit.mesh];
            if target.skipped || target.vertices.is_empty() {
                return Err(EditScriptError::MeshWithoutVertices(edit.mesh));
            }
            let capacity = target.record.vertex_count as usize;
            if edit.vertices.len() > capacity {
                return Err(EditScriptError::CountMismatch {
                    category: "mesh vertices",
                    expected: capacity,
                    actual: edit.vertices.len(),
                });
            }
            edits.vertex_edits.insert(edit.mesh, edit.vertices.clone());
        }

        Ok(edits)
    }

    /// Validate the `[track]` table against `track` and return it.
    pub fn compile_track(&self, track: &TrackGeometry) -> Result<TrackEdits, EditScriptError> {
        let Some(edits) = &self.track else {
            return Ok(TrackEdits::default());
        };

        check_len("grid", &edits.grid, track.starting_grid.len())?;
        check_len("pit boxes", &edits.pit_boxes, track.pit_boxes.len())?;
        check_len("pit unknowns", &edits.pit_unknowns, track.pit_boxes.len())?;
        check_len("checkpoints", &edits.checkpoints, track.checkpoints.len())?;
        check_len("cut track", &edits.cut_track, track.cut_track.len())?;

        replace_only("checkpoints", &edits.checkpoints)?;
        clear_only("checkpoint list", &edits.checkpoint_list)?;
        clear_only("boundary list", &edits.boundary_list)?;
        clear_only("road", &edits.road)?;

        if let CategoryEdit::Replace(runs) = &edits.boundaries {
            // Every run needs at least one record to carry its sentinel
            if runs.iter().any(Vec::is_empty) {
                return Err(EditScriptError::CountMismatch {
                    category: "boundary run",
                    expected: 1,
                    actual: 0,
                });
            }
            if let Some(run) = runs.iter().find(|run| run.len() > MAX_RUN_LEN) {
                return Err(EditScriptError::CountMismatch {
                    category: "boundary run",
                    expected: MAX_RUN_LEN,
                    actual: run.len(),
                });
            }
            let total: usize = runs.iter().map(Vec::len).sum();
            let expected = track.header.boundary_vertices.count as usize;
            if total != expected {
                return Err(EditScriptError::CountMismatch {
                    category: "boundaries",
                    expected,
                    actual: total,
                });
            }
        }

        Ok(edits.clone())
    }
}

fn check_mesh(mesh: usize, count: usize) -> Result<(), EditScriptError> {
    if mesh >= count {
        return Err(EditScriptError::UnknownMesh { mesh, count });
    }
    Ok(())
}

fn check_len<T>(
    category: &'static str,
    edit: &CategoryEdit<Vec<T>>,
    expected: usize,
) -> Result<(), EditScriptError> {
    match edit {
        CategoryEdit::Replace(records) if records.len() != expected => {
            Err(EditScriptError::CountMismatch {
                category,
                expected,
                actual: records.len(),
            })
        }
        _ => Ok(()),
    }
}

fn clear_only<T>(category: &'static str, edit: &CategoryEdit<T>) -> Result<(), EditScriptError> {
    match edit {
        CategoryEdit::Replace(_) => Err(EditScriptError::UnsupportedEdit {
            category,
            action: "replace",
        }),
        _ => Ok(()),
    }
}

fn replace_only<T>(category: &'static str, edit: &CategoryEdit<T>) -> Result<(), EditScriptError> {
    match edit {
        CategoryEdit::Clear => Err(EditScriptError::UnsupportedEdit {
            category,
            action: "clear",
        }),
        _ => Ok(()),
    }
}
