mod container_call;
mod layer_conv2d;
mod layer_dense;
mod layer_max_pool2d;
mod layer_merge;
mod serialization;
mod shape;
