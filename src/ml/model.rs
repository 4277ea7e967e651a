use burn::{
    nn::{
        loss::{MseLoss, Reduction},
        lstm::{Lstm, LstmConfig},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

// #[derive(Config)] supplies Clone and Serialize/Deserialize; this
// struct doubles as the model-structure file of a checkpoint.
#[derive(Config, Debug)]
pub struct FrameLstmConfig {
    pub framelen:        usize,
    pub hidden_size:     usize,
    pub num_layers:      usize,
    #[config(default = 0.0)]
    pub dropout:         f64,
    #[config(default = true)]
    pub learn_next_step: bool,
}

impl FrameLstmConfig {
    /// Build the layer stack on `device` with fresh weights.
    pub fn init<B: Backend>(&self, device: &B::Device) -> FrameLstm<B> {
        let layers: Vec<Lstm<B>> = (0..self.num_layers.max(1))
            .map(|i| {
                let d_input = if i == 0 { self.framelen } else { self.hidden_size };
                LstmConfig::new(d_input, self.hidden_size, true).init(device)
            })
            .collect();
        let head    = LinearConfig::new(self.hidden_size, self.framelen).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        FrameLstm {
            layers, head, dropout,
            learn_next_step: self.learn_next_step,
        }
    }
}

#[derive(Module, Debug)]
pub struct FrameLstm<B: Backend> {
    pub layers:          Vec<Lstm<B>>,
    pub head:            Linear<B>,
    pub dropout:         Dropout,
    pub learn_next_step: bool,
}

impl<B: Backend> FrameLstm<B> {
    /// inputs: [batch, seq_len, framelen]
    /// → [batch, 1, framelen] in next-step mode
    /// → [batch, seq_len, framelen] in sequence mode
    pub fn forward(&self, inputs: Tensor<B, 3>) -> Tensor<B, 3> {
        let mut x = inputs;
        for layer in &self.layers {
            let (hidden, _state) = layer.forward(x, None);
            x = self.dropout.forward(hidden);
        }

        let x = if self.learn_next_step {
            let [batch_size, seq_len, hidden] = x.dims();
            x.slice([0..batch_size, seq_len - 1..seq_len, 0..hidden])
        } else {
            x
        };

        self.head.forward(x)
    }

    /// Mean squared error between the forward pass and `targets`.
    pub fn forward_loss(&self, inputs: Tensor<B, 3>, targets: Tensor<B, 3>) -> Tensor<B, 1> {
        let output = self.forward(inputs);
        MseLoss::new().forward(output, targets, Reduction::Mean)
    }
}
