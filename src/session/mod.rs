/// Owner-thread editor driving background segmentation.
pub mod editor;
