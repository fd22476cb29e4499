use ahash::HashMap;
use glam::{Mat4, Vec3};
use strum::IntoEnumIterator;

use super::pose::{Finger, Joint, METACARPALS, PoseOverrides, bone_name};

pub type BoneIndex = u32;

pub const BONE_SENTINEL: BoneIndex = BoneIndex::MAX;

/// Size of the bone matrix array the skinning shader accepts.
pub const MAX_BONES: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum SkeletonError {
    #[error("Too many bones ({0}), at most 100 are supported")]
    TooManyBones(usize),
    #[error("Duplicate bone name ({0})")]
    DuplicateBone(String),
    #[error("Bone {bone} has parent {parent} which is not an earlier bone")]
    InvalidParent { bone: String, parent: BoneIndex },
}

/// Turns a set of local overrides into the matrices used for skinning.
pub trait SkeletonTransformResolver {
    /// One matrix per bone, in the order of the shader's bone array. Bones without an override are
    /// posed with an identity local transform but still follow their ancestors.
    fn resolve(&self, overrides: &PoseOverrides) -> Vec<Mat4>;
}

#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub parent: BoneIndex,
    /// Transform relative to the parent in the bind pose.
    pub rest: Mat4,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: BoneIndex, rest: Mat4) -> Self {
        Self {
            name: name.into(),
            parent,
            rest,
        }
    }
}

/// A fixed bone hierarchy. Parents always come before their children.
#[derive(Debug)]
pub struct Skeleton {
    name: String,
    bones: Vec<Bone>,
    /// Inverse of each bone's world transform in the bind pose.
    inverse_bind: Vec<Mat4>,
    /// Origin of each bone in the bind pose.
    bind_positions: Vec<Vec3>,
    lookup: HashMap<String, usize>,
}

impl Skeleton {
    pub fn new(name: impl Into<String>, bones: Vec<Bone>) -> Result<Self, SkeletonError> {
        if bones.len() > MAX_BONES {
            return Err(SkeletonError::TooManyBones(bones.len()));
        }

        let mut lookup = HashMap::default();
        let mut bind: Vec<Mat4> = Vec::with_capacity(bones.len());

        for (index, bone) in bones.iter().enumerate() {
            if lookup.insert(bone.name.clone(), index).is_some() {
                return Err(SkeletonError::DuplicateBone(bone.name.clone()));
            }

            let parent_transform = if bone.parent == BONE_SENTINEL {
                Mat4::IDENTITY
            } else if (bone.parent as usize) < index {
                bind[bone.parent as usize]
            } else {
                return Err(SkeletonError::InvalidParent {
                    bone: bone.name.clone(),
                    parent: bone.parent,
                });
            };

            bind.push(parent_transform * bone.rest);
        }

        Ok(Self {
            name: name.into(),
            bones,
            inverse_bind: bind.iter().map(Mat4::inverse).collect(),
            bind_positions: bind.iter().map(|m| m.w_axis.truncate()).collect(),
            lookup,
        })
    }

    /// The hand used by the viewer: a `metacarpals` root with a four bone chain per finger. Each
    /// finger bone points along its local +X and bends around its local +Z.
    pub fn hand() -> Result<Self, SkeletonError> {
        let mut bones = vec![Bone::new(METACARPALS, BONE_SENTINEL, Mat4::IDENTITY)];

        for finger in Finger::iter() {
            let layout = FingerLayout::of(finger);

            let mut parent = 0;
            let mut rest = Mat4::from_translation(layout.base)
                * Mat4::from_rotation_z(layout.angle.to_radians());

            for (joint, length) in Joint::iter().zip(
                std::iter::once(0.0).chain(layout.lengths.iter().copied()),
            ) {
                if joint != Joint::Proximal {
                    rest = Mat4::from_translation(Vec3::new(length, 0.0, 0.0));
                }
                bones.push(Bone::new(bone_name(finger, joint), parent, rest));
                parent = bones.len() as BoneIndex - 1;
            }
        }

        Self::new("Hand", bones)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// One line per bone with a parent, from the parent's origin to the bone's origin in the bind
    /// pose. Each end carries the index of the bone whose skinning matrix moves it.
    pub fn bone_segments(&self) -> Vec<[(Vec3, BoneIndex); 2]> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, bone)| bone.parent != BONE_SENTINEL)
            .map(|(index, bone)| {
                let parent = bone.parent as usize;
                [
                    (self.bind_positions[parent], bone.parent),
                    (self.bind_positions[index], index as BoneIndex),
                ]
            })
            .collect()
    }
}

impl SkeletonTransformResolver for Skeleton {
    fn resolve(&self, overrides: &PoseOverrides) -> Vec<Mat4> {
        let mut world: Vec<Mat4> = Vec::with_capacity(self.bones.len());

        for bone in self.bones.iter() {
            let parent_transform = if bone.parent == BONE_SENTINEL {
                Mat4::IDENTITY
            } else {
                world[bone.parent as usize]
            };

            world.push(parent_transform * bone.rest * overrides.get(&bone.name));
        }

        world
            .iter()
            .zip(self.inverse_bind.iter())
            .map(|(posed, inverse_bind)| *posed * *inverse_bind)
            .collect()
    }
}

/// Where a finger starts on the palm and how long its bones are.
struct FingerLayout {
    base: Vec3,
    /// Rotation of the finger around the palm normal in *degrees*. 90 points straight up.
    angle: f32,
    /// Lengths of the proximal, intermediate and distal bones.
    lengths: [f32; 3],
}

impl FingerLayout {
    fn of(finger: Finger) -> Self {
        let (base, angle, lengths) = match finger {
            Finger::Thumb => (Vec3::new(2.2, 1.5, 0.0), 40.0, [2.0, 1.6, 1.3]),
            Finger::Index => (Vec3::new(1.2, 5.0, 0.0), 85.0, [2.4, 1.6, 1.2]),
            Finger::Middle => (Vec3::new(0.0, 5.2, 0.0), 90.0, [2.6, 1.7, 1.3]),
            Finger::Ring => (Vec3::new(-1.2, 5.0, 0.0), 95.0, [2.4, 1.6, 1.2]),
            Finger::Pinky => (Vec3::new(-2.3, 4.6, 0.0), 100.0, [1.9, 1.3, 1.0]),
        };

        Self {
            base,
            angle,
            lengths,
        }
    }
}
