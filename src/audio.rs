//! 音效提示
//!
//! 配对成功 / 失败两种提示音。播放失败只记录日志，不影响游戏。

use std::io::{self, Write};
use std::process::{Child, Command, Stdio};

use crate::storage::SoundConfig;

/// 提示音类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Match,
    Fail,
}

impl Cue {
    pub fn name(&self) -> &'static str {
        match self {
            Cue::Match => "match",
            Cue::Fail => "fail",
        }
    }
}

/// 提示音播放接口
pub trait CuePlayer {
    fn play(&mut self, cue: Cue);
}

/// 终端下的播放器：配置了外部播放命令时调用命令播放音频文件，否则响铃
pub struct SoundBoard {
    player: Option<String>,
    match_sound: String,
    fail_sound: String,
    children: Vec<Child>,
}

impl SoundBoard {
    pub fn new(config: &SoundConfig) -> Self {
        Self {
            player: config.player.clone().filter(|p| !p.trim().is_empty()),
            match_sound: config.match_sound.clone(),
            fail_sound: config.fail_sound.clone(),
            children: Vec::new(),
        }
    }

    fn sound_for(&self, cue: Cue) -> &str {
        match cue {
            Cue::Match => &self.match_sound,
            Cue::Fail => &self.fail_sound,
        }
    }

    fn spawn(&mut self, command: &str, path: &str) -> io::Result<()> {
        // 回收已结束的子进程
        self.children
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));

        let child = Command::new(command)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.children.push(child);
        Ok(())
    }

    fn bell() -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()
    }
}

impl CuePlayer for SoundBoard {
    fn play(&mut self, cue: Cue) {
        let result = match self.player.clone() {
            Some(command) => {
                let path = self.sound_for(cue).to_string();
                self.spawn(&command, &path)
            }
            None => Self::bell(),
        };

        if let Err(e) = result {
            tracing::warn!(cue = cue.name(), error = %e, "failed to play cue");
        }
    }
}

/// 记录播放过的提示音（测试用）
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    pub played: Vec<Cue>,
}

#[cfg(test)]
impl CuePlayer for RecordingPlayer {
    fn play(&mut self, cue: Cue) {
        self.played.push(cue);
    }
}
