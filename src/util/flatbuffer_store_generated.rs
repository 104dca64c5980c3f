// automatically generated by the FlatBuffers compiler, do not modify
// @generated

#[allow(unused_imports, dead_code, clippy::all)]
pub mod store {

  use flatbuffers::Follow;

pub enum FileDataOffset {}
#[derive(Copy, Clone, PartialEq)]

pub struct FileData<'a> {
  pub _tab: flatbuffers::Table<'a>,
}

impl<'a> flatbuffers::Follow<'a> for FileData<'a> {
  type Inner = FileData<'a>;
  #[inline]
  unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
    Self { _tab: flatbuffers::Table::new(buf, loc) }
  }
}

impl<'a> FileData<'a> {
  pub const VT_DATA: flatbuffers::VOffsetT = 4;
  pub const VT_MEDIA_TYPE: flatbuffers::VOffsetT = 6;

  #[inline]
  pub unsafe fn init_from_table(table: flatbuffers::Table<'a>) -> Self {
    FileData { _tab: table }
  }
  #[allow(unused_mut)]
  pub fn create<'bldr: 'args, 'args: 'mut_bldr, 'mut_bldr>(
    _fbb: &'mut_bldr mut flatbuffers::FlatBufferBuilder<'bldr>,
    args: &'args FileDataArgs<'args>
  ) -> flatbuffers::WIPOffset<FileData<'bldr>> {
    let mut builder = FileDataBuilder::new(_fbb);
    if let Some(x) = args.media_type { builder.add_media_type(x); }
    if let Some(x) = args.data { builder.add_data(x); }
    builder.finish()
  }


  #[inline]
  pub fn data(&self) -> Option<flatbuffers::Vector<'a, u8>> {
    // Safety:
    // Created from valid Table for this object
    // which contains a valid value in this slot
    unsafe { self._tab.get::<flatbuffers::ForwardsUOffset<flatbuffers::Vector<'a, u8>>>(FileData::VT_DATA, None)}
  }
  #[inline]
  pub fn media_type(&self) -> Option<&'a str> {
    // Safety:
    // Created from valid Table for this object
    // which contains a valid value in this slot
    unsafe { self._tab.get::<flatbuffers::ForwardsUOffset<&str>>(FileData::VT_MEDIA_TYPE, None)}
  }
}

impl flatbuffers::Verifiable for FileData<'_> {
  #[inline]
  fn run_verifier(
    v: &mut flatbuffers::Verifier, pos: usize
  ) -> Result<(), flatbuffers::InvalidFlatbuffer> {
    v.visit_table(pos)?
     .visit_field::<flatbuffers::ForwardsUOffset<flatbuffers::Vector<'_, u8>>>("data", Self::VT_DATA, false)?
     .visit_field::<flatbuffers::ForwardsUOffset<&str>>("media_type", Self::VT_MEDIA_TYPE, false)?
     .finish();
    Ok(())
  }
}
pub struct FileDataArgs<'a> {
    pub data: Option<flatbuffers::WIPOffset<flatbuffers::Vector<'a, u8>>>,
    pub media_type: Option<flatbuffers::WIPOffset<&'a str>>,
}
impl<'a> Default for FileDataArgs<'a> {
  #[inline]
  fn default() -> Self {
    FileDataArgs {
      data: None,
      media_type: None,
    }
  }
}

pub struct FileDataBuilder<'a: 'b, 'b> {
  fbb_: &'b mut flatbuffers::FlatBufferBuilder<'a>,
  start_: flatbuffers::WIPOffset<flatbuffers::TableUnfinishedWIPOffset>,
}
impl<'a: 'b, 'b> FileDataBuilder<'a, 'b> {
  #[inline]
  pub fn add_data(&mut self, data: flatbuffers::WIPOffset<flatbuffers::Vector<'b , u8>>) {
    self.fbb_.push_slot_always::<flatbuffers::WIPOffset<_>>(FileData::VT_DATA, data);
  }
  #[inline]
  pub fn add_media_type(&mut self, media_type: flatbuffers::WIPOffset<&'b  str>) {
    self.fbb_.push_slot_always::<flatbuffers::WIPOffset<_>>(FileData::VT_MEDIA_TYPE, media_type);
  }
  #[inline]
  pub fn new(_fbb: &'b mut flatbuffers::FlatBufferBuilder<'a>) -> FileDataBuilder<'a, 'b> {
    let start = _fbb.start_table();
    FileDataBuilder {
      fbb_: _fbb,
      start_: start,
    }
  }
  #[inline]
  pub fn finish(self) -> flatbuffers::WIPOffset<FileData<'a>> {
    let o = self.fbb_.end_table(self.start_);
    flatbuffers::WIPOffset::new(o.value())
  }
}

pub enum FileDataListOffset {}
#[derive(Copy, Clone, PartialEq)]

pub struct FileDataList<'a> {
  pub _tab: flatbuffers::Table<'a>,
}

impl<'a> flatbuffers::Follow<'a> for FileDataList<'a> {
  type Inner = FileDataList<'a>;
  #[inline]
  unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
    Self { _tab: flatbuffers::Table::new(buf, loc) }
  }
}

impl<'a> FileDataList<'a> {
  pub const VT_FILES: flatbuffers::VOffsetT = 4;

  #[inline]
  pub unsafe fn init_from_table(table: flatbuffers::Table<'a>) -> Self {
    FileDataList { _tab: table }
  }
  #[allow(unused_mut)]
  pub fn create<'bldr: 'args, 'args: 'mut_bldr, 'mut_bldr>(
    _fbb: &'mut_bldr mut flatbuffers::FlatBufferBuilder<'bldr>,
    args: &'args FileDataListArgs<'args>
  ) -> flatbuffers::WIPOffset<FileDataList<'bldr>> {
    let mut builder = FileDataListBuilder::new(_fbb);
    if let Some(x) = args.files { builder.add_files(x); }
    builder.finish()
  }


  #[inline]
  pub fn files(&self) -> Option<flatbuffers::Vector<'a, flatbuffers::ForwardsUOffset<FileData<'a>>>> {
    // Safety:
    // Created from valid Table for this object
    // which contains a valid value in this slot
    unsafe { self._tab.get::<flatbuffers::ForwardsUOffset<flatbuffers::Vector<'a, flatbuffers::ForwardsUOffset<FileData>>>>(FileDataList::VT_FILES, None)}
  }
}

impl flatbuffers::Verifiable for FileDataList<'_> {
  #[inline]
  fn run_verifier(
    v: &mut flatbuffers::Verifier, pos: usize
  ) -> Result<(), flatbuffers::InvalidFlatbuffer> {
    v.visit_table(pos)?
     .visit_field::<flatbuffers::ForwardsUOffset<flatbuffers::Vector<'_, flatbuffers::ForwardsUOffset<FileData>>>>("files", Self::VT_FILES, false)?
     .finish();
    Ok(())
  }
}
pub struct FileDataListArgs<'a> {
    pub files: Option<flatbuffers::WIPOffset<flatbuffers::Vector<'a, flatbuffers::ForwardsUOffset<FileData<'a>>>>>,
}
impl<'a> Default for FileDataListArgs<'a> {
  #[inline]
  fn default() -> Self {
    FileDataListArgs {
      files: None,
    }
  }
}

pub struct FileDataListBuilder<'a: 'b, 'b> {
  fbb_: &'b mut flatbuffers::FlatBufferBuilder<'a>,
  start_: flatbuffers::WIPOffset<flatbuffers::TableUnfinishedWIPOffset>,
}
impl<'a: 'b, 'b> FileDataListBuilder<'a, 'b> {
  #[inline]
  pub fn add_files(&mut self, files: flatbuffers::WIPOffset<flatbuffers::Vector<'b , flatbuffers::ForwardsUOffset<FileData<'b >>>>) {
    self.fbb_.push_slot_always::<flatbuffers::WIPOffset<_>>(FileDataList::VT_FILES, files);
  }
  #[inline]
  pub fn new(_fbb: &'b mut flatbuffers::FlatBufferBuilder<'a>) -> FileDataListBuilder<'a, 'b> {
    let start = _fbb.start_table();
    FileDataListBuilder {
      fbb_: _fbb,
      start_: start,
    }
  }
  #[inline]
  pub fn finish(self) -> flatbuffers::WIPOffset<FileDataList<'a>> {
    let o = self.fbb_.end_table(self.start_);
    flatbuffers::WIPOffset::new(o.value())
  }
}

#[inline]
/// Verifies that a buffer of bytes contains a `FileDataList`
/// and returns it.
pub fn root_as_file_data_list(buf: &[u8]) -> Result<FileDataList, flatbuffers::InvalidFlatbuffer> {
  flatbuffers::root::<FileDataList>(buf)
}
#[inline]
pub fn finish_file_data_list_buffer<'a, 'b>(
    fbb: &'b mut flatbuffers::FlatBufferBuilder<'a>,
    root: flatbuffers::WIPOffset<FileDataList<'a>>) {
  fbb.finish(root, None);
}
}  // pub mod store
