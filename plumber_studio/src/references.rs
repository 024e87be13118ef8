//! Post-decode check of cross-references between collections.
//!
//! The format does not guarantee that stored indices point at existing
//! entries. Dangling references are reported, never clamped or dropped.

use std::fmt::{self, Display};

use crate::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceSource {
    BoneParent {
        bone: usize,
    },
    ControllerBone {
        controller: usize,
    },
    HitboxBone {
        set: usize,
        hitbox: usize,
    },
    EyeBallBone {
        body_part: usize,
        model: usize,
        eyeball: usize,
    },
    EyeBallTexture {
        body_part: usize,
        model: usize,
        eyeball: usize,
    },
}

impl Display for ReferenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoneParent { bone } => write!(f, "parent of bone {bone}"),
            Self::ControllerBone { controller } => write!(f, "bone of controller {controller}"),
            Self::HitboxBone { set, hitbox } => {
                write!(f, "bone of hitbox {hitbox} in set {set}")
            }
            Self::EyeBallBone {
                body_part,
                model,
                eyeball,
            } => write!(
                f,
                "bone of eyeball {eyeball} in body part {body_part} model {model}"
            ),
            Self::EyeBallTexture {
                body_part,
                model,
                eyeball,
            } => write!(
                f,
                "texture of eyeball {eyeball} in body part {body_part} model {model}"
            ),
        }
    }
}

/// An index that doesn't resolve to an entry of its target collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DanglingReference {
    pub source: ReferenceSource,
    pub index: i32,
}

impl Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} refers to missing index {}", self.source, self.index)
    }
}

pub(crate) fn find_dangling(model: &Model) -> Vec<DanglingReference> {
    let mut dangling = Vec::new();

    let mut check = |source, index: i32, none_allowed: bool, exists: &dyn Fn(usize) -> bool| {
        let valid = match usize::try_from(index) {
            Ok(i) => exists(i),
            Err(_) => none_allowed && index == -1,
        };
        if !valid {
            dangling.push(DanglingReference { source, index });
        }
    };

    let bone_exists = |i: usize| model.bone(i).is_some();
    let texture_exists = |i: usize| model.texture(i).is_some();

    for (&bone, entry) in model.bones() {
        check(
            ReferenceSource::BoneParent { bone },
            entry.parent,
            true,
            &bone_exists,
        );
    }

    for (controller, entry) in model.bone_controllers().iter().enumerate() {
        check(
            ReferenceSource::ControllerBone { controller },
            entry.bone,
            true,
            &bone_exists,
        );
    }

    for (set, entry) in model.hitbox_sets().iter().enumerate() {
        for (hitbox, bbox) in entry.boxes.iter().enumerate() {
            check(
                ReferenceSource::HitboxBone { set, hitbox },
                bbox.bone,
                false,
                &bone_exists,
            );
        }
    }

    for (body_part, part) in model.body_parts().iter().enumerate() {
        for (model_index, studio_model) in part.models.iter().enumerate() {
            for (eyeball, entry) in studio_model.eyeballs.iter().enumerate() {
                check(
                    ReferenceSource::EyeBallBone {
                        body_part,
                        model: model_index,
                        eyeball,
                    },
                    entry.bone,
                    false,
                    &bone_exists,
                );
                check(
                    ReferenceSource::EyeBallTexture {
                        body_part,
                        model: model_index,
                        eyeball,
                    },
                    entry.texture,
                    false,
                    &texture_exists,
                );
            }
        }
    }

    dangling
}
