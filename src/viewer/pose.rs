use ahash::HashMap;
use glam::Mat4;

/// Name of the root bone of the hand.
pub const METACARPALS: &str = "metacarpals";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

/// A bone along a finger, ordered from the palm outwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum Joint {
    #[strum(to_string = "proximal_phalange")]
    Proximal,
    #[strum(to_string = "intermediate_phalange")]
    Intermediate,
    #[strum(to_string = "distal_phalange")]
    Distal,
    #[strum(to_string = "fingertip")]
    Fingertip,
}

/// The name of a finger bone as it appears in the hand's hierarchy, e.g.
/// `index_proximal_phalange`.
pub fn bone_name(finger: Finger, joint: Joint) -> String {
    format!("{finger}_{joint}")
}

/// Local transforms that replace the identity for a subset of bones.
///
/// Any bone without an entry is treated as having an identity override. Looking up a missing
/// bone is never an error.
#[derive(Clone, Debug, Default)]
pub struct PoseOverrides {
    overrides: HashMap<String, Mat4>,
}

impl PoseOverrides {
    /// The local override for a bone, or the identity if none is set.
    pub fn get(&self, bone: &str) -> Mat4 {
        self.overrides.get(bone).copied().unwrap_or(Mat4::IDENTITY)
    }

    pub fn contains(&self, bone: &str) -> bool {
        self.overrides.contains_key(bone)
    }

    pub fn set(&mut self, bone: impl Into<String>, transform: Mat4) {
        self.overrides.insert(bone.into(), transform);
    }

    pub fn set_joint(&mut self, finger: Finger, joint: Joint, transform: Mat4) {
        self.set(bone_name(finger, joint), transform);
    }

    pub fn joint(&self, finger: Finger, joint: Joint) -> Mat4 {
        self.get(&bone_name(finger, joint))
    }

    /// Reset every finger bone to identity. The root bone keeps its override.
    pub fn clear_fingers(&mut self) {
        use strum::IntoEnumIterator;

        for finger in Finger::iter() {
            for joint in Joint::iter() {
                self.set_joint(finger, joint, Mat4::IDENTITY);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Mat4)> {
        self.overrides.iter().map(|(name, m)| (name.as_str(), m))
    }
}
