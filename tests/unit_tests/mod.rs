mod mesh;
mod orientation;
mod procedural;
